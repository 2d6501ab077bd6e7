use super::SourceAdapter;
use crate::types::{DetectionEvent, SourceKind, SourcePayload};
use crate::window::{SignalWindow, MIN_VARIANCE_SAMPLES};

/// Coarse-signal adapter settings.
#[derive(Debug, Clone)]
pub struct RssiConfig {
    pub window_size: usize,
    /// Window variance above this reports motion.
    pub variance_threshold: f64,
    /// Divisor mapping variance onto the [0, 1] confidence range.
    pub normalization: f64,
}

impl Default for RssiConfig {
    fn default() -> Self {
        Self {
            window_size: 50,
            variance_threshold: 5.0,
            normalization: 20.0,
        }
    }
}

/// Turns a stream of scalar signal-strength readings into detection
/// events via variance thresholding over a sliding window.
#[derive(Debug)]
pub struct RssiAdapter {
    config: RssiConfig,
    window: SignalWindow<f64>,
}

impl RssiAdapter {
    pub fn new(config: RssiConfig) -> Self {
        let window = SignalWindow::new(config.window_size);
        Self { config, window }
    }
}

impl SourceAdapter for RssiAdapter {
    type Input = f64;

    fn process(&mut self, level: f64) -> DetectionEvent {
        self.window.push(level);

        if self.window.len() < MIN_VARIANCE_SAMPLES {
            // Not enough history for a variance estimate: report the
            // raw level only.
            return DetectionEvent::now(
                SourceKind::WifiRssi,
                false,
                0.0,
                SourcePayload::Signal {
                    level,
                    variance: None,
                },
            );
        }

        let variance = self.window.variance();
        let motion = variance > self.config.variance_threshold;
        let confidence = (variance / self.config.normalization).min(1.0);

        let mut event = DetectionEvent::now(
            SourceKind::WifiRssi,
            motion,
            confidence,
            SourcePayload::Signal {
                level,
                variance: Some(variance),
            },
        );
        event.activity = if motion { "WALKING" } else { "STILL" }.to_string();
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(adapter: &mut RssiAdapter, levels: &[f64]) -> DetectionEvent {
        let mut last = None;
        for &level in levels {
            last = Some(adapter.process(level));
        }
        last.expect("at least one sample")
    }

    #[test]
    fn below_min_samples_reports_raw_level_only() {
        let mut adapter = RssiAdapter::new(RssiConfig::default());
        let event = feed(&mut adapter, &[-50.0, -52.0, -51.0, -49.0]);
        assert!(!event.motion);
        assert_eq!(event.confidence, 0.0);
        assert_eq!(event.activity, "UNKNOWN");
        assert_eq!(
            event.payload,
            SourcePayload::Signal {
                level: -49.0,
                variance: None
            }
        );
    }

    #[test]
    fn quiet_signal_stays_still() {
        let mut adapter = RssiAdapter::new(RssiConfig::default());
        // Sub-threshold jitter around -50 dBm.
        let levels: Vec<f64> = (0..20).map(|i| -50.0 + (i % 2) as f64).collect();
        let event = feed(&mut adapter, &levels);
        assert!(!event.motion);
        assert_eq!(event.activity, "STILL");
        assert_eq!(event.source, SourceKind::WifiRssi);
    }

    #[test]
    fn swinging_signal_reports_walking() {
        let mut adapter = RssiAdapter::new(RssiConfig::default());
        let levels: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { -40.0 } else { -60.0 })
            .collect();
        let event = feed(&mut adapter, &levels);
        assert!(event.motion);
        assert_eq!(event.activity, "WALKING");
        assert!(event.confidence > 0.0 && event.confidence <= 1.0);
    }

    #[test]
    fn confidence_is_clamped_to_one() {
        let mut adapter = RssiAdapter::new(RssiConfig {
            normalization: 1.0,
            ..RssiConfig::default()
        });
        let levels: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 0.0 } else { -90.0 })
            .collect();
        let event = feed(&mut adapter, &levels);
        assert_eq!(event.confidence, 1.0);
    }
}
