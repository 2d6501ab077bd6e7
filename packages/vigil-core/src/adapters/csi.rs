use super::SourceAdapter;
use crate::types::{DetectionEvent, SourceKind, SourcePayload};
use crate::window::{population_variance, SignalWindow};

/// Optional sequence classifier over the accumulated sample window.
///
/// The model itself lives outside the engine; whatever is plugged in
/// here gets the window contents (oldest first) and may return an
/// activity label with its confidence. `None` leaves the adapter's
/// variance-based labeling in place.
pub trait ActivityClassifier: Send + Sync {
    fn classify(&self, window: &[Vec<f64>]) -> Option<(String, f64)>;
}

/// Fine-signal adapter settings.
#[derive(Debug, Clone)]
pub struct CsiConfig {
    pub window_size: usize,
    /// Intra-sample variance above this reports motion.
    pub motion_threshold: f64,
}

impl Default for CsiConfig {
    fn default() -> Self {
        Self {
            window_size: 100,
            motion_threshold: 0.3,
        }
    }
}

/// Processes per-subcarrier amplitude vectors. Motion is decided from
/// the variance across the current sample's components, not across the
/// time window; the window only feeds the optional classifier.
pub struct CsiAdapter {
    config: CsiConfig,
    window: SignalWindow<Vec<f64>>,
    classifier: Option<Box<dyn ActivityClassifier>>,
}

impl CsiAdapter {
    pub fn new(config: CsiConfig) -> Self {
        let window = SignalWindow::new(config.window_size);
        Self {
            config,
            window,
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn ActivityClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }
}

impl SourceAdapter for CsiAdapter {
    type Input = Vec<f64>;

    fn process(&mut self, amplitudes: Vec<f64>) -> DetectionEvent {
        let variance = population_variance(&amplitudes);
        let motion = variance > self.config.motion_threshold;
        let confidence = variance.min(1.0);

        self.window.push(amplitudes.clone());

        let mut event = DetectionEvent::now(
            SourceKind::WifiCsi,
            motion,
            confidence,
            SourcePayload::Channels { amplitudes },
        );
        event.activity = if motion { "MOTION" } else { "CLEAR" }.to_string();

        if let Some(classifier) = &self.classifier {
            if let Some((label, label_confidence)) = classifier.classify(self.window.as_contiguous())
            {
                event.activity = label;
                event.activity_confidence = label_confidence;
            }
        }

        event
    }
}
