use crate::commands::Shell;
use chatgate_core::config::PACKAGES;
use chatgate_core::AppError;

/// Binaries that must be on PATH once the packages are in.
const REQUIRED_BINARIES: &[&str] = &["nginx", "ufw", "certbot", "git"];

pub fn install_command() -> String {
    format!(
        "apt-get update && DEBIAN_FRONTEND=noninteractive apt-get install -y {}",
        PACKAGES.join(" ")
    )
}

/// Update the package index and install the fixed package set.
pub async fn install(shell: &dyn Shell) -> Result<(), AppError> {
    shell
        .run(&install_command())
        .await
        .map_err(|e| AppError::provision("package install", e))?;

    for bin in REQUIRED_BINARIES {
        shell
            .run(&format!("command -v {bin} >/dev/null"))
            .await
            .map_err(|_| AppError::Postcondition(format!("{bin} not found after install")))?;
    }
    Ok(())
}
