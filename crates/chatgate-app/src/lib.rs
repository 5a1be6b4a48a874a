pub mod llm;
pub mod logs;
pub mod routes;
pub mod session;
pub mod state;

pub use routes::router;
pub use state::{AppConfig, AppState};

use chatgate_core::{AppError, ProjectLayout};
use llm::OpenAiClient;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Options for `chatgate serve`.
#[derive(Debug, Clone)]
pub struct ServeOpts {
    pub project: PathBuf,
    pub bind: SocketAddr,
    pub require_auth_on_api: bool,
    pub model: String,
    pub api_base: String,
    pub upstream_timeout: Duration,
}

/// Load the project, bind, and serve until SIGINT/SIGTERM.
pub async fn serve(opts: ServeOpts) -> Result<(), AppError> {
    let layout = ProjectLayout::new(&opts.project);
    let config = AppConfig::load(&layout, &opts.model, opts.require_auth_on_api)?;
    let chat = OpenAiClient::new(&config.api_key, &opts.api_base, opts.upstream_timeout)?;
    let state = AppState::new(config, Arc::new(chat));

    let listener = tokio::net::TcpListener::bind(opts.bind).await?;
    tracing::info!(
        addr = %opts.bind,
        project = %opts.project.display(),
        require_auth_on_api = opts.require_auth_on_api,
        "chat app listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("chat app stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
