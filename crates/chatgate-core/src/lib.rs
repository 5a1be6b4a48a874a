pub mod config;
pub mod envfile;
pub mod error;
pub mod secrets;

pub use config::{DeployRecord, DeploymentConfig, HostPaths, ProjectLayout};
pub use error::AppError;
