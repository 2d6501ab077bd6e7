use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use vigil_core::{DetectionEvent, FusionEngine};

use crate::config::ServerConfig;
use crate::hub::BroadcastHub;

/// One annotated video frame from the vision backend, ready for the
/// video feed.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub jpeg: Vec<u8>,
    /// Float Unix seconds, matching the detection feed timestamps.
    pub timestamp: f64,
}

/// Main server state shared across all listener tasks and handlers.
///
/// The fusion engine and the latest-event slots are the only shared
/// mutable resources; everything else is owned by its task.
pub struct ServerState {
    pub config: ServerConfig,
    pub hub: BroadcastHub,
    pub fusion: Mutex<FusionEngine>,
    /// Most recent WiFi-derived event, consumed by the fusion cycle.
    latest_wifi: RwLock<Option<DetectionEvent>>,
    /// Most recent annotated frame from the vision backend.
    latest_video: RwLock<Option<Arc<VideoFrame>>>,
    /// Cleared when the vision backend fails to initialize.
    vision_active: AtomicBool,
    pub start_time: Instant,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        let fusion = FusionEngine::new(config.fusion_config());
        let vision_active = AtomicBool::new(config.camera.enabled);
        Self {
            config,
            hub: BroadcastHub::new(),
            fusion: Mutex::new(fusion),
            latest_wifi: RwLock::new(None),
            latest_video: RwLock::new(None),
            vision_active,
            start_time: Instant::now(),
        }
    }

    /// Record a WiFi-derived event for the next fusion cycle.
    pub fn store_wifi_event(&self, event: DetectionEvent) {
        *self.latest_wifi.write() = Some(event);
    }

    pub fn latest_wifi_event(&self) -> Option<DetectionEvent> {
        self.latest_wifi.read().clone()
    }

    pub fn store_video_frame(&self, frame: VideoFrame) {
        *self.latest_video.write() = Some(Arc::new(frame));
    }

    pub fn latest_video_frame(&self) -> Option<Arc<VideoFrame>> {
        self.latest_video.read().clone()
    }

    /// Whether the vision source is live (configured on and backend
    /// initialized).
    pub fn vision_active(&self) -> bool {
        self.vision_active.load(Ordering::Relaxed)
    }

    /// Disable the vision source for the rest of the process lifetime.
    pub fn disable_vision(&self) {
        self.vision_active.store(false, Ordering::Relaxed);
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
