use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vigil_core::{CsiConfig, FusionConfig, MonitorConfig, RssiConfig, VisionConfig};

/// Which sources the deployment runs. Hybrid is the only mode with the
/// fusion arbiter active; single-source modes stream that source's
/// events directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    Camera,
    Rssi,
    Csi,
    Monitor,
    Hybrid,
}

impl DetectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMode::Camera => "camera",
            DetectionMode::Rssi => "rssi",
            DetectionMode::Csi => "csi",
            DetectionMode::Monitor => "monitor",
            DetectionMode::Hybrid => "hybrid",
        }
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "camera" => Ok(DetectionMode::Camera),
            "rssi" => Ok(DetectionMode::Rssi),
            "csi" => Ok(DetectionMode::Csi),
            "monitor" => Ok(DetectionMode::Monitor),
            "hybrid" => Ok(DetectionMode::Hybrid),
            other => Err(ConfigError::InvalidValue(format!(
                "unknown detection mode: {other}"
            ))),
        }
    }
}

/// Camera source configuration.
#[derive(Debug, Clone, Serialize)]
pub struct CameraSettings {
    pub enabled: bool,
    pub fps: u32,
    /// Name of the vision backend to construct; "none" disables vision.
    pub backend: String,
}

/// Coarse-signal (scalar RSSI) source configuration.
#[derive(Debug, Clone, Serialize)]
pub struct RssiSettings {
    pub enabled: bool,
    pub udp_port: u16,
    pub window_size: usize,
    pub variance_threshold: f64,
    pub normalization: f64,
}

/// Fine-signal (subcarrier vector) source configuration.
#[derive(Debug, Clone, Serialize)]
pub struct CsiSettings {
    pub enabled: bool,
    pub udp_port: u16,
    pub window_size: usize,
    pub motion_threshold: f64,
}

/// Raw-packet (monitor-mode capture) source configuration.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSettings {
    pub enabled: bool,
    pub udp_port: u16,
    pub packet_window: usize,
}

/// Fusion configuration.
#[derive(Debug, Clone, Serialize)]
pub struct FusionSettings {
    pub handoff_delay_ms: u64,
    pub confidence_threshold: f64,
    pub tracking_timeout_s: u64,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind address (0.0.0.0 for LAN, 127.0.0.1 for localhost)
    pub bind_addr: String,
    /// CORS allowed origins (comma-separated in env var, "*" for any)
    pub cors_origins: Vec<String>,
    pub mode: DetectionMode,
    pub camera: CameraSettings,
    pub rssi: RssiSettings,
    pub csi: CsiSettings,
    pub monitor: MonitorSettings,
    pub fusion: FusionSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables. The detection
    /// mode decides which sources are on by default; per-source
    /// `*_ENABLED` variables override it.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mode = DetectionMode::parse(
            &env::var("VIGIL_MODE").unwrap_or_else(|_| "hybrid".to_string()),
        )?;

        let camera_default = matches!(mode, DetectionMode::Camera | DetectionMode::Hybrid);
        let rssi_default = matches!(mode, DetectionMode::Rssi | DetectionMode::Hybrid);
        let csi_default = matches!(mode, DetectionMode::Csi | DetectionMode::Hybrid);
        let monitor_default = matches!(mode, DetectionMode::Monitor | DetectionMode::Hybrid);

        let config = Self {
            port: env::var("VIGIL_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            bind_addr: env::var("VIGIL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            cors_origins: env::var("VIGIL_CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            mode,
            camera: CameraSettings {
                enabled: env_bool("VIGIL_CAMERA_ENABLED", camera_default),
                fps: env_parse("VIGIL_CAMERA_FPS", 30),
                backend: env::var("VIGIL_CAMERA_BACKEND").unwrap_or_else(|_| "none".to_string()),
            },
            rssi: RssiSettings {
                enabled: env_bool("VIGIL_RSSI_ENABLED", rssi_default),
                udp_port: env_parse("VIGIL_RSSI_PORT", 8888),
                window_size: env_parse("VIGIL_RSSI_WINDOW_SIZE", 50),
                variance_threshold: env_parse("VIGIL_RSSI_VARIANCE_THRESHOLD", 5.0),
                normalization: env_parse("VIGIL_RSSI_NORMALIZATION", 20.0),
            },
            csi: CsiSettings {
                enabled: env_bool("VIGIL_CSI_ENABLED", csi_default),
                udp_port: env_parse("VIGIL_CSI_PORT", 8889),
                window_size: env_parse("VIGIL_CSI_WINDOW_SIZE", 100),
                motion_threshold: env_parse("VIGIL_CSI_MOTION_THRESHOLD", 0.3),
            },
            monitor: MonitorSettings {
                enabled: env_bool("VIGIL_MONITOR_ENABLED", monitor_default),
                udp_port: env_parse("VIGIL_MONITOR_PORT", 9000),
                packet_window: env_parse("VIGIL_MONITOR_PACKET_WINDOW", 200),
            },
            fusion: FusionSettings {
                handoff_delay_ms: env_parse("VIGIL_HANDOFF_DELAY_MS", 500),
                confidence_threshold: env_parse("VIGIL_CONFIDENCE_THRESHOLD", 0.4),
                tracking_timeout_s: env_parse("VIGIL_TRACKING_TIMEOUT_S", 5),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.enabled && self.camera.fps == 0 {
            return Err(ConfigError::InvalidValue(
                "VIGIL_CAMERA_FPS must be at least 1".to_string(),
            ));
        }
        for (name, size) in [
            ("VIGIL_RSSI_WINDOW_SIZE", self.rssi.window_size),
            ("VIGIL_CSI_WINDOW_SIZE", self.csi.window_size),
            ("VIGIL_MONITOR_PACKET_WINDOW", self.monitor.packet_window),
        ] {
            if size == 0 {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must be at least 1"
                )));
            }
        }
        Ok(())
    }

    /// Get the full bind address (addr:port)
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Whether the fusion arbiter runs (hybrid deployments only).
    pub fn fusion_enabled(&self) -> bool {
        self.mode == DetectionMode::Hybrid
    }

    pub fn rssi_config(&self) -> RssiConfig {
        RssiConfig {
            window_size: self.rssi.window_size,
            variance_threshold: self.rssi.variance_threshold,
            normalization: self.rssi.normalization,
        }
    }

    pub fn csi_config(&self) -> CsiConfig {
        CsiConfig {
            window_size: self.csi.window_size,
            motion_threshold: self.csi.motion_threshold,
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            packet_window: self.monitor.packet_window,
        }
    }

    pub fn vision_config(&self) -> VisionConfig {
        VisionConfig {
            tracking_timeout: Duration::from_secs(self.fusion.tracking_timeout_s),
        }
    }

    pub fn fusion_config(&self) -> FusionConfig {
        FusionConfig {
            handoff_delay: Duration::from_millis(self.fusion.handoff_delay_ms),
            confidence_threshold: self.fusion.confidence_threshold,
        }
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}
