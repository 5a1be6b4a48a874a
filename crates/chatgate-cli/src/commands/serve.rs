use anyhow::{Context, Result};
use chatgate_app::ServeOpts;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Parameters for the serve command.
pub struct ServeArgs {
    pub project: PathBuf,
    pub bind: SocketAddr,
    pub require_auth_on_api: bool,
    pub model: String,
    pub api_base: String,
    pub upstream_timeout_secs: u64,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let project = std::fs::canonicalize(&args.project)
        .with_context(|| format!("Project directory {} not found", args.project.display()))?;

    let opts = ServeOpts {
        project,
        bind: args.bind,
        require_auth_on_api: args.require_auth_on_api,
        model: args.model,
        api_base: args.api_base,
        upstream_timeout: Duration::from_secs(args.upstream_timeout_secs),
    };
    chatgate_app::serve(opts)
        .await
        .context("Chat application failed")
}
