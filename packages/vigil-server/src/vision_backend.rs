//! Boundary to the external detection/pose model.
//!
//! The model itself (object detector, pose estimator, frame
//! annotation) is not part of this server; whatever provides it
//! implements [`VisionBackend`]. The built-in `synthetic` backend
//! generates a scripted scene so the full vision-to-fusion pipeline can
//! run without camera hardware, mirroring the simulator used for the
//! UDP sources.

use anyhow::{anyhow, Result};
use vigil_core::Observation;

use crate::config::CameraSettings;

/// One captured frame's worth of detector output.
#[derive(Debug, Clone, Default)]
pub struct VisionFrame {
    pub observations: Vec<Observation>,
    /// JPEG with boxes/skeletons burned in, when the backend renders
    /// one. Feeds the video stream; absent frames are simply skipped.
    pub annotated_jpeg: Option<Vec<u8>>,
}

/// Camera + detector capability. `capture` may block its caller (the
/// vision task runs on a blocking thread); implementations release the
/// camera on drop.
pub trait VisionBackend: Send {
    fn capture(&mut self) -> Result<VisionFrame>;
}

/// Construct the backend named in the configuration.
pub fn backend_from_config(camera: &CameraSettings) -> Result<Box<dyn VisionBackend>> {
    match camera.backend.as_str() {
        "synthetic" => Ok(Box::new(SyntheticBackend::new())),
        "none" | "" => Err(anyhow!("no vision backend configured")),
        other => Err(anyhow!("unknown vision backend: {other}")),
    }
}

/// Scripted scene: a person walks through the frame for a while, then
/// leaves it empty, on a fixed cycle. Useful for demos and for
/// exercising the handoff path end to end.
pub struct SyntheticBackend {
    tick: u64,
}

/// Frames per presence/absence cycle.
const CYCLE_LEN: u64 = 300;
/// Fraction of the cycle during which the subject is visible.
const VISIBLE_TICKS: u64 = 200;

impl SyntheticBackend {
    pub fn new() -> Self {
        Self { tick: 0 }
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VisionBackend for SyntheticBackend {
    fn capture(&mut self) -> Result<VisionFrame> {
        let phase = self.tick % CYCLE_LEN;
        self.tick += 1;

        if phase >= VISIBLE_TICKS {
            return Ok(VisionFrame::default());
        }

        // Walk left to right across a nominal 640x480 frame.
        let x = (phase as f64 / VISIBLE_TICKS as f64) * 500.0;
        let bbox = [x as i32, 120, x as i32 + 80, 420];

        Ok(VisionFrame {
            observations: vec![Observation {
                bbox,
                class_id: 0,
                class_name: "person".to_string(),
                confidence: 0.9,
                keypoints: None,
            }],
            annotated_jpeg: None,
        })
    }
}
