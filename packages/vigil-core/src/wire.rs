//! Flat JSON representation of a [`DetectionEvent`] for the live feed.
//!
//! The feed keeps one fixed key set regardless of source; fields that a
//! source does not produce are empty lists or null. Timestamps are
//! float Unix seconds.

use serde::{Deserialize, Serialize};

use crate::types::{DetectionEvent, Pose, SourceKind, SourcePayload};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDetection {
    pub timestamp: f64,
    pub source: SourceKind,
    pub motion: bool,
    pub confidence: f64,

    // Vision fields
    pub bboxes: Vec<[i32; 4]>,
    pub class_ids: Vec<u32>,
    pub class_names: Vec<String>,
    pub tracking_ids: Vec<u32>,
    pub poses: Vec<Option<Pose>>,

    // WiFi fields
    pub rssi: Option<f64>,
    pub rssi_var: Option<f64>,
    pub csi: Vec<f64>,

    // Activity
    pub activity: String,
    pub activity_conf: f64,

    // Fusion metadata
    pub out_of_frame: bool,
    pub handoff_active: bool,
}

impl From<&DetectionEvent> for WireDetection {
    fn from(event: &DetectionEvent) -> Self {
        let mut wire = WireDetection {
            timestamp: event.timestamp.timestamp_millis() as f64 / 1000.0,
            source: event.source,
            motion: event.motion,
            confidence: event.confidence,
            bboxes: Vec::new(),
            class_ids: Vec::new(),
            class_names: Vec::new(),
            tracking_ids: Vec::new(),
            poses: Vec::new(),
            rssi: None,
            rssi_var: None,
            csi: Vec::new(),
            activity: event.activity.clone(),
            activity_conf: event.activity_confidence,
            out_of_frame: event.out_of_frame,
            handoff_active: event.handoff_active,
        };

        match &event.payload {
            SourcePayload::Vision { tracks } => {
                for track in tracks {
                    wire.bboxes.push(track.bbox);
                    wire.class_ids.push(track.class_id);
                    wire.class_names.push(track.class_name.clone());
                    wire.tracking_ids.push(track.tracking_id);
                    wire.poses.push(track.pose.clone());
                }
            }
            SourcePayload::Signal { level, variance } => {
                wire.rssi = Some(*level);
                wire.rssi_var = *variance;
            }
            SourcePayload::Channels { amplitudes } => {
                wire.csi = amplitudes.clone();
            }
            SourcePayload::Empty => {}
        }

        wire
    }
}
