pub mod adapters;
pub mod decode;
pub mod error;
pub mod fusion;
pub mod types;
pub mod window;
pub mod wire;

pub use adapters::{
    ActivityClassifier, CsiAdapter, CsiConfig, MonitorAdapter, MonitorConfig, RssiAdapter,
    RssiConfig, SourceAdapter, VisionAdapter, VisionConfig,
};
pub use error::{EngineError, Result};
pub use fusion::{FusionConfig, FusionEngine};
pub use types::*;
pub use window::{SignalWindow, MIN_VARIANCE_SAMPLES};
pub use wire::WireDetection;
