//! End-to-end engine test: adapter output feeding fusion cycles, the
//! way the server's vision timer drives it.

use std::time::{Duration, Instant};

use vigil_core::{
    DetectionEvent, FusionConfig, FusionEngine, Observation, RssiAdapter, RssiConfig, SourceAdapter,
    SourceKind, VisionAdapter, VisionConfig,
};

fn person(bbox: [i32; 4]) -> Observation {
    Observation {
        bbox,
        class_id: 0,
        class_name: "person".to_string(),
        confidence: 0.85,
        keypoints: None,
    }
}

/// A subject walks out of frame while carrying a phone whose signal
/// keeps swinging: vision holds authority through the handoff delay,
/// then the coarse-signal source takes over, then vision reacquires.
#[test]
fn vision_loss_hands_off_to_wifi_and_back() {
    let mut vision = VisionAdapter::new(VisionConfig::default());
    let mut rssi = RssiAdapter::new(RssiConfig::default());
    let mut engine = FusionEngine::new(FusionConfig {
        handoff_delay: Duration::from_millis(500),
        confidence_threshold: 0.4,
    });

    // Noisy signal source: the subject keeps moving.
    let mut wifi_event: Option<DetectionEvent> = None;
    for i in 0..20 {
        let level = if i % 2 == 0 { -40.0 } else { -62.0 };
        wifi_event = Some(rssi.process(level));
    }
    let wifi_event = wifi_event.unwrap();
    assert!(wifi_event.motion);

    let t0 = Instant::now();

    // Subject visible: fusion mirrors vision.
    let seen = vision.process(vec![person([100, 100, 200, 300])]);
    let out = engine.fuse_at(t0, Some(&seen), Some(&wifi_event));
    assert_eq!(out.source, SourceKind::Fusion);
    assert!(out.motion);
    assert!(!out.handoff_active);

    // Subject leaves the frame: vision stays authoritative while the
    // handoff delay runs.
    let empty = vision.process(vec![]);
    for ms in [0u64, 150, 300, 450] {
        let out = engine.fuse_at(
            t0 + Duration::from_secs(1) + Duration::from_millis(ms),
            Some(&empty),
            Some(&wifi_event),
        );
        assert_eq!(out.source, SourceKind::Camera, "at +{ms}ms");
        assert!(!out.motion);
        assert!(!out.handoff_active);
    }

    // First cycle past the delay: WiFi takes over, flagged as handoff.
    let handed = engine.fuse_at(
        t0 + Duration::from_secs(1) + Duration::from_millis(500),
        Some(&empty),
        Some(&wifi_event),
    );
    assert_eq!(handed.source, SourceKind::Fusion);
    assert!(handed.motion);
    assert!(handed.handoff_active);
    assert!(handed.out_of_frame);
    assert_eq!(handed.confidence, wifi_event.confidence);

    // Subject steps back into the frame: instant reacquisition with the
    // same tracking id (the track is well within its staleness window).
    let reacquired_vision = vision.process(vec![person([120, 100, 220, 300])]);
    let reacquired = engine.fuse_at(
        t0 + Duration::from_secs(2),
        Some(&reacquired_vision),
        Some(&wifi_event),
    );
    assert_eq!(reacquired.source, SourceKind::Fusion);
    assert!(reacquired.motion);
    assert!(!reacquired.handoff_active);
    assert!(!reacquired.out_of_frame);
}

/// With every source dark, fusion emits the synthetic LOST event.
#[test]
fn all_sources_dark_reports_lost() {
    let mut engine = FusionEngine::new(FusionConfig::default());
    let out = engine.fuse(None, None);
    assert_eq!(out.source, SourceKind::Lost);
    assert!(!out.motion);
    assert_eq!(out.confidence, 0.0);
}
