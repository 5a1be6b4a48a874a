use crate::assets::{APP_JS, CHAT_HTML, LOGIN_HTML, STYLE_CSS};
use crate::commands::{chown_to, Shell};
use chatgate_core::config::BINARY_NAME;
use chatgate_core::{envfile, AppError, DeploymentConfig, ProjectLayout};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// `runtime.json`: what the runtime installer must put in place.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RuntimeManifest {
    pub package: String,
    pub version: String,
    /// Path of the runtime executable, relative to the project root.
    pub binary: String,
    pub sha256: String,
    pub components: Vec<Component>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Component {
    pub name: String,
    pub role: String,
}

impl RuntimeManifest {
    pub fn new(binary_sha256: String) -> Self {
        let components = [
            ("axum", "web framework"),
            ("tokio", "production server runtime"),
            ("reqwest", "language-model API client"),
            ("dotenvy", "environment file loader"),
        ]
        .into_iter()
        .map(|(name, role)| Component {
            name: name.into(),
            role: role.into(),
        })
        .collect();

        Self {
            package: BINARY_NAME.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            binary: format!("runtime/bin/{BINARY_NAME}"),
            sha256: binary_sha256,
            components,
        }
    }

    pub fn load(layout: &ProjectLayout) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(layout.manifest())?;
        Ok(serde_json::from_str(&text)?)
    }
}

pub fn sha256_file(path: &Path) -> Result<String, AppError> {
    let bytes = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

fn render_template(template: &str, cfg: &DeploymentConfig) -> String {
    template.replace("{{ instance_name }}", &cfg.instance_name)
}

/// Write the manifest, secrets file, templates and static assets.
/// Every file is truncated and rewritten on re-run.
pub async fn write(
    shell: &dyn Shell,
    cfg: &DeploymentConfig,
    layout: &ProjectLayout,
    runtime_source: &Path,
) -> Result<(), AppError> {
    let manifest = RuntimeManifest::new(sha256_file(runtime_source)?);
    std::fs::write(layout.manifest(), serde_json::to_string_pretty(&manifest)?)?;

    envfile::write_private(&layout.env_file(), &envfile::render(cfg))?;

    let templates = layout.templates_dir();
    std::fs::write(templates.join("chat.html"), render_template(CHAT_HTML, cfg))?;
    std::fs::write(templates.join("login.html"), render_template(LOGIN_HTML, cfg))?;

    let statics = layout.static_dir();
    std::fs::write(statics.join("style.css"), STYLE_CSS)?;
    std::fs::write(statics.join("app.js"), APP_JS)?;

    chown_to(shell, &cfg.os_user, layout.root())
        .await
        .map_err(|e| AppError::provision("application files", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_config, RecordingShell};
    use chatgate_core::config::{ENV_API_KEY, ENV_PASSWORD, ENV_SESSION_SECRET, ENV_SYSTEM_PROMPT};

    async fn generate() -> (tempfile::TempDir, ProjectLayout) {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(tmp.path().join("helpbot"));
        for dir in layout.directories() {
            std::fs::create_dir_all(dir).unwrap();
        }
        let exe = tmp.path().join("exe");
        std::fs::write(&exe, b"binary").unwrap();
        write(&RecordingShell::default(), &sample_config(), &layout, &exe)
            .await
            .unwrap();
        (tmp, layout)
    }

    #[tokio::test]
    async fn writes_all_project_files() {
        let (_tmp, layout) = generate().await;
        for path in [
            layout.manifest(),
            layout.env_file(),
            layout.templates_dir().join("chat.html"),
            layout.templates_dir().join("login.html"),
            layout.static_dir().join("style.css"),
            layout.static_dir().join("app.js"),
        ] {
            assert!(path.is_file(), "{} missing", path.display());
        }
        let chat = std::fs::read_to_string(layout.templates_dir().join("chat.html")).unwrap();
        assert!(chat.contains("<title>helpbot</title>"));
        let login = std::fs::read_to_string(layout.templates_dir().join("login.html")).unwrap();
        assert!(login.contains("{{ error }}"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn secrets_file_is_private_with_four_keys() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, layout) = generate().await;
        let mode = std::fs::metadata(layout.env_file())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);

        let vars = envfile::read(&layout.env_file()).unwrap();
        let mut keys: Vec<&str> = vars.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut expected = vec![ENV_API_KEY, ENV_PASSWORD, ENV_SYSTEM_PROMPT, ENV_SESSION_SECRET];
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[tokio::test]
    async fn manifest_records_binary_hash() {
        let (_tmp, layout) = generate().await;
        let manifest = RuntimeManifest::load(&layout).unwrap();
        assert_eq!(manifest.binary, "runtime/bin/chatgate");
        assert_eq!(
            manifest.sha256,
            hex::encode(Sha256::digest(b"binary"))
        );
        assert_eq!(manifest.components.len(), 4);
    }
}
