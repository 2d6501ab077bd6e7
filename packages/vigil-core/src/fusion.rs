//! Arbitration between the vision source and the latest WiFi-derived
//! source.
//!
//! Vision is authoritative the instant it reports motion. When vision
//! holds the frame but sees nothing, a handoff clock starts; once it
//! exceeds the configured delay and a WiFi source reports motion, the
//! WiFi opinion takes over, flagged as an out-of-frame handoff. There is
//! deliberately no hysteresis on reacquisition.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::types::{DetectionEvent, SourceKind};

#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// How long vision must report nothing before a WiFi source may
    /// take over.
    pub handoff_delay: Duration,
    /// Recognized configuration knob, surfaced through the server's
    /// config endpoint; the arbitration itself does not consult it.
    pub confidence_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            handoff_delay: Duration::from_millis(500),
            confidence_threshold: 0.4,
        }
    }
}

/// Stateful arbiter combining the latest vision event and the latest
/// WiFi-derived event into one authoritative event per fusion cycle.
#[derive(Debug)]
pub struct FusionEngine {
    config: FusionConfig,
    handoff_start: Option<Instant>,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self {
            config,
            handoff_start: None,
        }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Whether the handoff clock is currently running.
    pub fn handoff_pending(&self) -> bool {
        self.handoff_start.is_some()
    }

    /// Run one fusion cycle against the current wall clock.
    pub fn fuse(
        &mut self,
        vision: Option<&DetectionEvent>,
        wifi: Option<&DetectionEvent>,
    ) -> DetectionEvent {
        self.fuse_at(Instant::now(), vision, wifi)
    }

    /// Deterministic fusion cycle: `now` drives the handoff timing.
    pub fn fuse_at(
        &mut self,
        now: Instant,
        vision: Option<&DetectionEvent>,
        wifi: Option<&DetectionEvent>,
    ) -> DetectionEvent {
        if let Some(v) = vision {
            if v.motion {
                // Vision reacquisition always wins immediately.
                if self.handoff_start.take().is_some() {
                    debug!("vision reacquired, handoff clock cleared");
                }
                return v.retagged(SourceKind::Fusion);
            }

            let started = *self.handoff_start.get_or_insert(now);
            if now.duration_since(started) >= self.config.handoff_delay {
                if let Some(w) = wifi {
                    if w.motion {
                        debug!(
                            "handing off to {} after {:?} without a vision detection",
                            w.source.as_str(),
                            now.duration_since(started)
                        );
                        let mut event = w.retagged(SourceKind::Fusion);
                        event.handoff_active = true;
                        event.out_of_frame = true;
                        return event;
                    }
                }
            }
            return v.clone();
        }

        if let Some(w) = wifi {
            return w.clone();
        }

        DetectionEvent::lost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourcePayload;

    fn vision_event(motion: bool) -> DetectionEvent {
        let mut event = DetectionEvent::now(
            SourceKind::Camera,
            motion,
            if motion { 0.8 } else { 0.0 },
            SourcePayload::Vision { tracks: vec![] },
        );
        event.activity = "UNKNOWN".to_string();
        event
    }

    fn wifi_event(motion: bool) -> DetectionEvent {
        let mut event = DetectionEvent::now(
            SourceKind::WifiRssi,
            motion,
            0.6,
            SourcePayload::Signal {
                level: -48.0,
                variance: Some(12.0),
            },
        );
        event.activity = "WALKING".to_string();
        event
    }

    #[test]
    fn vision_motion_wins_and_clears_handoff() {
        let mut engine = FusionEngine::new(FusionConfig::default());
        let t0 = Instant::now();

        // Prime the handoff clock with a few empty vision cycles.
        engine.fuse_at(t0, Some(&vision_event(false)), None);
        assert!(engine.handoff_pending());

        let out = engine.fuse_at(
            t0 + Duration::from_millis(100),
            Some(&vision_event(true)),
            Some(&wifi_event(true)),
        );
        assert_eq!(out.source, SourceKind::Fusion);
        assert!(out.motion);
        assert!(!out.handoff_active);
        assert!(!engine.handoff_pending());
    }

    #[test]
    fn handoff_fires_only_after_delay() {
        let mut engine = FusionEngine::new(FusionConfig::default());
        let t0 = Instant::now();
        let v = vision_event(false);
        let w = wifi_event(true);

        // Before the delay elapses the empty vision event passes through.
        let early = engine.fuse_at(t0, Some(&v), Some(&w));
        assert_eq!(early.source, SourceKind::Camera);
        assert!(!early.motion);

        let still_early = engine.fuse_at(t0 + Duration::from_millis(499), Some(&v), Some(&w));
        assert_eq!(still_early.source, SourceKind::Camera);
        assert!(!still_early.handoff_active);

        // First cycle at or past the delay switches to the WiFi opinion.
        let fired = engine.fuse_at(t0 + Duration::from_millis(500), Some(&v), Some(&w));
        assert_eq!(fired.source, SourceKind::Fusion);
        assert!(fired.motion);
        assert!(fired.handoff_active);
        assert!(fired.out_of_frame);
        assert_eq!(fired.confidence, 0.6);
        assert_eq!(fired.activity, "WALKING");
    }

    #[test]
    fn handoff_clock_is_not_restarted_by_repeat_cycles() {
        let mut engine = FusionEngine::new(FusionConfig::default());
        let t0 = Instant::now();
        let v = vision_event(false);
        let w = wifi_event(true);

        engine.fuse_at(t0, Some(&v), Some(&w));
        engine.fuse_at(t0 + Duration::from_millis(300), Some(&v), Some(&w));
        // 600 ms after the FIRST empty cycle, not the most recent one.
        let out = engine.fuse_at(t0 + Duration::from_millis(600), Some(&v), Some(&w));
        assert!(out.handoff_active);
    }

    #[test]
    fn negative_wifi_never_takes_over() {
        let mut engine = FusionEngine::new(FusionConfig::default());
        let t0 = Instant::now();
        let v = vision_event(false);
        let w = wifi_event(false);

        engine.fuse_at(t0, Some(&v), Some(&w));
        let out = engine.fuse_at(t0 + Duration::from_secs(5), Some(&v), Some(&w));
        assert_eq!(out.source, SourceKind::Camera);
        assert!(!out.handoff_active);
    }

    #[test]
    fn wifi_passes_through_without_vision() {
        let mut engine = FusionEngine::new(FusionConfig::default());
        let w = wifi_event(true);
        let out = engine.fuse_at(Instant::now(), None, Some(&w));
        // No vision source: the WiFi event is forwarded as-is, untagged.
        assert_eq!(out.source, SourceKind::WifiRssi);
        assert_eq!(out.confidence, 0.6);
    }

    #[test]
    fn no_sources_yields_lost() {
        let mut engine = FusionEngine::new(FusionConfig::default());
        let out = engine.fuse_at(Instant::now(), None, None);
        assert_eq!(out.source, SourceKind::Lost);
        assert!(!out.motion);
        assert_eq!(out.confidence, 0.0);
    }

    #[test]
    fn reacquisition_resets_timing_for_next_handoff() {
        let mut engine = FusionEngine::new(FusionConfig::default());
        let t0 = Instant::now();
        let w = wifi_event(true);

        engine.fuse_at(t0, Some(&vision_event(false)), Some(&w));
        engine.fuse_at(t0 + Duration::from_millis(400), Some(&vision_event(true)), Some(&w));

        // The clock restarts from the next empty cycle.
        let restarted = engine.fuse_at(
            t0 + Duration::from_millis(450),
            Some(&vision_event(false)),
            Some(&w),
        );
        assert_eq!(restarted.source, SourceKind::Camera);

        let before = engine.fuse_at(
            t0 + Duration::from_millis(900),
            Some(&vision_event(false)),
            Some(&w),
        );
        assert!(!before.handoff_active);

        let after = engine.fuse_at(
            t0 + Duration::from_millis(950),
            Some(&vision_event(false)),
            Some(&w),
        );
        assert!(after.handoff_active);
    }
}
