use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};
use vigil_core::{SourceAdapter, VisionAdapter};

use crate::state::{ServerState, VideoFrame};
use crate::vision_backend::VisionBackend;

/// Spawn the fixed-rate vision polling loop on a blocking thread.
///
/// Frame grabs and detector calls may block; running them on a
/// dedicated blocking task keeps the WiFi listeners responsive. In
/// hybrid mode each poll is also one fusion cycle, publishing the
/// authoritative event; otherwise the vision event is published as-is.
pub fn spawn_vision_loop(state: Arc<ServerState>, mut backend: Box<dyn VisionBackend>) {
    let fps = state.config.camera.fps.max(1);
    let frame_delay = Duration::from_secs_f64(1.0 / f64::from(fps));
    let fusion_enabled = state.config.fusion_enabled();
    let mut adapter = VisionAdapter::new(state.config.vision_config());

    info!("✓ Vision loop started at {} FPS", fps);

    tokio::task::spawn_blocking(move || loop {
        let cycle_start = Instant::now();

        match backend.capture() {
            Ok(frame) => {
                if let Some(jpeg) = frame.annotated_jpeg {
                    state.store_video_frame(VideoFrame {
                        jpeg,
                        timestamp: Utc::now().timestamp_millis() as f64 / 1000.0,
                    });
                }

                let vision_event = adapter.process(frame.observations);
                let out = if fusion_enabled {
                    let wifi = state.latest_wifi_event();
                    state.fusion.lock().fuse(Some(&vision_event), wifi.as_ref())
                } else {
                    vision_event
                };
                state.hub.publish(&out);
            }
            Err(e) => {
                warn!("Vision capture failed: {}", e);
                std::thread::sleep(Duration::from_secs(1));
            }
        }

        if let Some(remaining) = frame_delay.checked_sub(cycle_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    });
}
