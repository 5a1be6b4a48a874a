use crate::commands::{shell_escape, Shell};
use chatgate_core::{AppError, DeploymentConfig, HostPaths};

pub fn render_site(cfg: &DeploymentConfig) -> String {
    format!(
        r#"server {{
    listen 80;
    server_name {domain};

    location / {{
        proxy_pass http://127.0.0.1:{port};
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
    }}
}}
"#,
        domain = cfg.domain,
        port = cfg.port,
    )
}

pub fn certbot_command(domain: &str, email: &str) -> String {
    format!(
        "certbot --nginx -d {} --non-interactive --agree-tos -m {} --redirect",
        shell_escape(domain),
        shell_escape(email)
    )
}

/// Point `link` at `target`, replacing whatever is there.
fn replace_symlink(target: &std::path::Path, link: &std::path::Path) -> Result<(), AppError> {
    if link.symlink_metadata().is_ok() {
        std::fs::remove_file(link)?;
    }
    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link)?;
    #[cfg(not(unix))]
    std::fs::copy(target, link).map(|_| ())?;
    Ok(())
}

/// Write and enable the nginx site, validate and reload nginx.
pub async fn register(
    shell: &dyn Shell,
    paths: &HostPaths,
    cfg: &DeploymentConfig,
) -> Result<(), AppError> {
    let name = &cfg.instance_name;
    std::fs::create_dir_all(&paths.nginx_available)?;
    std::fs::create_dir_all(&paths.nginx_enabled)?;

    let site = paths.nginx_site(name);
    std::fs::write(&site, render_site(cfg))?;
    replace_symlink(&site, &paths.nginx_enabled_link(name))?;

    shell
        .run("nginx -t")
        .await
        .map_err(|e| AppError::provision("nginx config test", e))?;
    shell
        .run("systemctl reload nginx")
        .await
        .map_err(|e| AppError::provision("nginx reload", e))?;
    Ok(())
}

/// Obtain a certificate and let certbot rewrite the site for HTTPS.
/// With an existing certificate certbot reinstalls it, so re-runs are safe.
pub async fn obtain_certificate(
    shell: &dyn Shell,
    cfg: &DeploymentConfig,
    email: &str,
) -> Result<(), AppError> {
    shell
        .run(&certbot_command(&cfg.domain, email))
        .await
        .map_err(|e| AppError::provision("certbot", e))?;
    Ok(())
}
