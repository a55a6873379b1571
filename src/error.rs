use crate::config::ConfigError;
use crate::telemetry::TelemetryError;

/// Process-level failures surfaced by the binary at startup or serve time.
/// Request-scoped errors are mapped to response envelopes by the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("startup error: {0}")]
    Startup(#[from] crate::workflows::onboarding::RepositoryError),
}
