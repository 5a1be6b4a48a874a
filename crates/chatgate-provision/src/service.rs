use crate::commands::Shell;
use chatgate_core::config::SERVICE_WORKERS;
use chatgate_core::{AppError, DeploymentConfig, HostPaths, ProjectLayout};

pub fn render_unit(cfg: &DeploymentConfig, layout: &ProjectLayout) -> String {
    let root = layout.root().display();
    let bin_dir = layout.runtime_bin_dir();
    let binary = layout.runtime_binary();
    let auth_flag = if cfg.require_auth_on_api {
        " --require-auth-on-api"
    } else {
        ""
    };

    format!(
        r#"[Unit]
Description=chatgate chat bot ({name})
After=network.target

[Service]
User={user}
Group={user}
WorkingDirectory={root}
Environment="PATH={bin_dir}"
Environment="RUST_LOG=info"
ExecStart={binary} serve --project {root} --bind 127.0.0.1:{port} --workers {workers}{auth_flag}
Restart=always
RestartSec=3

[Install]
WantedBy=multi-user.target
"#,
        name = cfg.instance_name,
        user = cfg.os_user,
        bin_dir = bin_dir.display(),
        binary = binary.display(),
        port = cfg.port,
        workers = SERVICE_WORKERS,
    )
}

/// Write the systemd unit, then enable and (re)start it.
pub async fn register(
    shell: &dyn Shell,
    paths: &HostPaths,
    cfg: &DeploymentConfig,
    layout: &ProjectLayout,
) -> Result<(), AppError> {
    let name = &cfg.instance_name;
    std::fs::create_dir_all(&paths.systemd_dir)?;
    std::fs::write(paths.unit_file(name), render_unit(cfg, layout))?;

    for cmd in [
        "systemctl daemon-reload".to_string(),
        format!("systemctl enable {name}"),
        format!("systemctl restart {name}"),
    ] {
        shell
            .run(&cmd)
            .await
            .map_err(|e| AppError::provision("service registration", e))?;
    }

    shell
        .run(&format!("systemctl is-active --quiet {name}"))
        .await
        .map_err(|_| AppError::Postcondition(format!("service {name} is not active")))?;
    Ok(())
}
