use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("chatgate deploy must be run as root")]
    NotRoot,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No free port found in {start}-{end} after {attempts} attempts")]
    NoFreePort { start: u16, end: u16, attempts: u32 },

    #[error("Command `{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Provision error ({phase}): {message}")]
    Provision { phase: String, message: String },

    #[error("Postcondition failed: {0}")]
    Postcondition(String),

    #[error("Upstream API error: {0}")]
    Upstream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Env file error: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Wrap any error as a provisioning failure for the named phase.
    pub fn provision(phase: &str, err: impl std::fmt::Display) -> Self {
        AppError::Provision {
            phase: phase.into(),
            message: err.to_string(),
        }
    }
}
