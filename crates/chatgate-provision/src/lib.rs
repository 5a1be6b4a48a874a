mod assets;
pub mod commands;
pub mod edge;
mod firewall;
pub mod generator;
mod layout;
mod packages;
mod runtime;
pub mod service;
mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::{HostShell, Shell};

use chatgate_core::{AppError, DeployRecord, DeploymentConfig, HostPaths};
use chatgate_ui::progress;
use std::path::{Path, PathBuf};

const TOTAL_STEPS: usize = 8;

/// Options for one provisioning run.
pub struct ProvisionOpts<'a> {
    pub paths: &'a HostPaths,
    /// Executable copied into the project's runtime directory.
    pub runtime_source: &'a Path,
}

/// Run every provisioning step in order and save the deploy record.
///
/// Each step overwrites or guards what it creates, so running this again
/// against an already provisioned host converges on the same state.
pub async fn run(
    shell: &dyn Shell,
    cfg: &DeploymentConfig,
    opts: &ProvisionOpts<'_>,
) -> Result<(DeployRecord, PathBuf), AppError> {
    cfg.validate()?;
    let user = cfg.os_user.as_str();
    let layout = opts.paths.project_layout(cfg);

    progress::step(1, TOTAL_STEPS, &format!("Ensuring user '{user}' exists..."));
    user::ensure(shell, user).await?;

    progress::step(2, TOTAL_STEPS, "Installing system packages...");
    let sp = progress::spinner("apt-get install (this may take a few minutes)...");
    let installed = packages::install(shell).await;
    sp.finish_and_clear();
    installed?;
    progress::detail("Packages installed");

    progress::step(3, TOTAL_STEPS, "Configuring firewall...");
    firewall::configure(shell).await?;
    progress::detail("UFW active: OpenSSH + Nginx Full allowed");

    progress::step(4, TOTAL_STEPS, "Creating project directories...");
    layout::create(shell, &layout, user).await?;
    progress::detail(&format!("Project root: {}", layout.root().display()));

    progress::step(5, TOTAL_STEPS, "Writing application files...");
    generator::write(shell, cfg, &layout, opts.runtime_source).await?;
    progress::detail(&format!("Secrets: {} (mode 600)", layout.env_file().display()));

    progress::step(6, TOTAL_STEPS, "Installing runtime...");
    runtime::install(shell, &layout, user, opts.runtime_source).await?;
    progress::detail(&format!("Runtime: {}", layout.runtime_binary().display()));

    progress::step(7, TOTAL_STEPS, "Registering service...");
    service::register(shell, opts.paths, cfg, &layout).await?;
    progress::detail(&format!(
        "{} active on 127.0.0.1:{}",
        cfg.instance_name, cfg.port
    ));

    progress::step(8, TOTAL_STEPS, "Configuring nginx...");
    edge::register(shell, opts.paths, cfg).await?;
    progress::detail(&format!("Site enabled for {}", cfg.domain));
    match &cfg.tls_email {
        Some(email) => {
            let sp = progress::spinner("Requesting TLS certificate from Let's Encrypt...");
            let issued = edge::obtain_certificate(shell, cfg, email).await;
            sp.finish_and_clear();
            issued?;
            progress::detail("TLS certificate installed, HTTP redirects to HTTPS");
        }
        None => progress::warn("TLS skipped; the site is served over plain HTTP"),
    }

    let record = DeployRecord::new(cfg, &layout);
    let record_path = record.save(&layout)?;
    commands::chown_to(shell, user, &record_path).await?;
    Ok((record, record_path))
}
