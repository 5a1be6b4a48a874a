mod commands;

use chatgate_core::config::{
    CHAT_MODEL, DEFAULT_API_BASE, DEFAULT_UPSTREAM_TIMEOUT_SECS, SERVICE_WORKERS,
};
use clap::{Parser, Subcommand};
use commands::serve::ServeArgs;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "chatgate",
    version,
    about = "Provision and serve a password-gated chat bot"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive 1-shot install: user → packages → firewall → app → systemd → nginx (+ TLS)
    Deploy,

    /// Run the chat web application for a provisioned project
    Serve {
        /// Project directory holding .env, templates/ and static/
        #[arg(long, env = "CHATGATE_PROJECT", default_value = ".")]
        project: PathBuf,

        /// Address to listen on (the nginx site proxies to it)
        #[arg(long, env = "CHATGATE_BIND", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,

        /// Runtime worker threads
        #[arg(long, default_value_t = SERVICE_WORKERS)]
        workers: usize,

        /// Reject /api/chat requests that carry no authenticated session
        #[arg(long, env = "CHATGATE_REQUIRE_AUTH_ON_API")]
        require_auth_on_api: bool,

        /// Chat-completions model identifier
        #[arg(long, env = "CHATGATE_MODEL", default_value = CHAT_MODEL)]
        model: String,

        /// Base URL of the OpenAI-compatible API
        #[arg(long, env = "OPENAI_API_BASE", default_value = DEFAULT_API_BASE)]
        api_base: String,

        /// Upper bound on a single upstream call, in seconds
        #[arg(long, env = "CHATGATE_UPSTREAM_TIMEOUT_SECS", default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS)]
        upstream_timeout_secs: u64,

        /// Emit JSON log lines
        #[arg(long)]
        log_json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy => {
            chatgate_app::logs::init_logging("warn", false)?;
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(commands::deploy::run())?;
        }
        Commands::Serve {
            project,
            bind,
            workers,
            require_auth_on_api,
            model,
            api_base,
            upstream_timeout_secs,
            log_json,
        } => {
            chatgate_app::logs::init_logging("info", log_json)?;
            let args = ServeArgs {
                project,
                bind,
                require_auth_on_api,
                model,
                api_base,
                upstream_timeout_secs,
            };
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(workers.max(1))
                .enable_all()
                .build()?;
            rt.block_on(commands::serve::run(args))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_defaults_match_the_unit_file() {
        let cli = Cli::try_parse_from([
            "chatgate",
            "serve",
            "--project",
            "/home/bot/helpbot",
            "--bind",
            "127.0.0.1:5123",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve {
                project,
                bind,
                workers,
                model,
                upstream_timeout_secs,
                ..
            } => {
                assert_eq!(project, PathBuf::from("/home/bot/helpbot"));
                assert_eq!(bind.port(), 5123);
                assert_eq!(workers, 3);
                assert_eq!(model, CHAT_MODEL);
                assert_eq!(upstream_timeout_secs, DEFAULT_UPSTREAM_TIMEOUT_SECS);
            }
            Commands::Deploy => panic!("parsed as deploy"),
        }
    }

    #[test]
    fn deploy_takes_no_flags() {
        assert!(Cli::try_parse_from(["chatgate", "deploy", "--domain", "x"]).is_err());
    }
}
