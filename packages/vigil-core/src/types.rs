use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of subcarrier amplitudes carried by one fine-signal sample.
pub const CSI_SUBCARRIERS: usize = 64;

/// Where a detection event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Camera,
    WifiRssi,
    WifiCsi,
    WifiMonitor,
    Fusion,
    Lost,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Camera => "camera",
            SourceKind::WifiRssi => "wifi_rssi",
            SourceKind::WifiCsi => "wifi_csi",
            SourceKind::WifiMonitor => "wifi_monitor",
            SourceKind::Fusion => "fusion",
            SourceKind::Lost => "lost",
        }
    }
}

/// Keypoint skeleton attached to a tracked detection.
///
/// `keypoints` entries are `[x, y, score]`. For non-human classes the
/// skeleton is a schematic 5-point figure synthesized from the bounding
/// box and `is_animal` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: Vec<[f64; 3]>,
    pub is_animal: bool,
}

/// One tracked spatial observation from the vision source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Bounding box as `[x1, y1, x2, y2]`.
    pub bbox: [i32; 4],
    pub class_id: u32,
    pub class_name: String,
    pub tracking_id: u32,
    pub pose: Option<Pose>,
}

/// Raw per-frame observation handed to the vision adapter by the
/// detector backend. Tracking ids are assigned by the adapter, not the
/// backend.
#[derive(Debug, Clone)]
pub struct Observation {
    pub bbox: [i32; 4],
    pub class_id: u32,
    pub class_name: String,
    pub confidence: f64,
    /// Estimated skeleton for person detections, when the backend runs
    /// pose estimation.
    pub keypoints: Option<Vec<[f64; 3]>>,
}

/// Source-specific payload of a [`DetectionEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourcePayload {
    /// Vision source: zero or more tracked detections.
    Vision { tracks: Vec<Track> },
    /// Coarse scalar source: signal level plus window variance once
    /// enough samples have accumulated.
    Signal { level: f64, variance: Option<f64> },
    /// Fine vector source: per-subcarrier amplitudes of the current
    /// sample.
    Channels { amplitudes: Vec<f64> },
    /// No payload (raw-packet source, LOST events).
    Empty,
}

/// The unit of output from every source adapter and from fusion.
///
/// `confidence` always originates with the producing source; fusion
/// re-tags events but never invents confidence values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub timestamp: DateTime<Utc>,
    pub source: SourceKind,
    pub motion: bool,
    pub confidence: f64,
    /// Free-form activity tag, `"UNKNOWN"` when the source does not
    /// classify activity.
    pub activity: String,
    pub activity_confidence: f64,
    pub out_of_frame: bool,
    pub handoff_active: bool,
    pub payload: SourcePayload,
}

impl DetectionEvent {
    /// New event stamped with the current wall clock and default
    /// activity/fusion metadata.
    pub fn now(source: SourceKind, motion: bool, confidence: f64, payload: SourcePayload) -> Self {
        Self {
            timestamp: Utc::now(),
            source,
            motion,
            confidence,
            activity: "UNKNOWN".to_string(),
            activity_confidence: 0.0,
            out_of_frame: false,
            handoff_active: false,
            payload,
        }
    }

    /// Synthetic event emitted when no source reports.
    pub fn lost() -> Self {
        Self::now(SourceKind::Lost, false, 0.0, SourcePayload::Empty)
    }

    /// Copy of this event attributed to a different source. Confidence
    /// and payload are carried through untouched.
    pub fn retagged(&self, source: SourceKind) -> Self {
        let mut event = self.clone();
        event.source = source;
        event
    }
}
