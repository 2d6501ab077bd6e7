use super::SourceAdapter;
use crate::types::{DetectionEvent, SourceKind, SourcePayload};
use crate::window::SignalWindow;

/// Variance threshold over the packet window. Fixed: this adapter is a
/// low-fidelity fallback and is not tuned per deployment.
const PACKET_VARIANCE_THRESHOLD: f64 = 10.0;

/// Samples required before the packet window votes on motion.
const MIN_PACKET_SAMPLES: usize = 6;

/// Placeholder confidence: per-packet signal levels carry too little
/// information for a calibrated estimate.
const PACKET_CONFIDENCE: f64 = 0.5;

/// Raw-packet adapter settings.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub packet_window: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { packet_window: 200 }
    }
}

/// Accumulates per-packet signal levels from a monitor-mode capture and
/// thresholds their variance.
#[derive(Debug)]
pub struct MonitorAdapter {
    window: SignalWindow<f64>,
}

impl MonitorAdapter {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            window: SignalWindow::new(config.packet_window),
        }
    }
}

impl SourceAdapter for MonitorAdapter {
    type Input = f64;

    fn process(&mut self, rssi: f64) -> DetectionEvent {
        self.window.push(rssi);

        let variance = if self.window.len() >= MIN_PACKET_SAMPLES {
            self.window.variance()
        } else {
            0.0
        };
        let motion = variance > PACKET_VARIANCE_THRESHOLD;

        DetectionEvent::now(
            SourceKind::WifiMonitor,
            motion,
            PACKET_CONFIDENCE,
            SourcePayload::Empty,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_vote_before_six_packets() {
        let mut adapter = MonitorAdapter::new(MonitorConfig::default());
        for &rssi in &[-30.0, -90.0, -30.0, -90.0, -30.0] {
            let event = adapter.process(rssi);
            assert!(!event.motion);
            assert_eq!(event.confidence, PACKET_CONFIDENCE);
        }
    }

    #[test]
    fn noisy_packets_report_motion() {
        let mut adapter = MonitorAdapter::new(MonitorConfig::default());
        let mut last = None;
        for i in 0..10 {
            let rssi = if i % 2 == 0 { -30.0 } else { -90.0 };
            last = Some(adapter.process(rssi));
        }
        let event = last.unwrap();
        assert!(event.motion);
        assert_eq!(event.source, SourceKind::WifiMonitor);
        assert_eq!(event.payload, SourcePayload::Empty);
    }

    #[test]
    fn steady_packets_stay_quiet() {
        let mut adapter = MonitorAdapter::new(MonitorConfig::default());
        let mut last = None;
        for _ in 0..20 {
            last = Some(adapter.process(-55.0));
        }
        assert!(!last.unwrap().motion);
    }
}
