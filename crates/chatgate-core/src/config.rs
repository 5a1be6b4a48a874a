use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const BINARY_NAME: &str = "chatgate";
pub const PORT_RANGE_START: u16 = 5000;
pub const PORT_RANGE_END: u16 = 5999;
pub const PORT_PICK_ATTEMPTS: u32 = 200;
pub const SERVICE_WORKERS: usize = 3;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

pub const CHAT_MODEL: &str = "gpt-4o-mini";
pub const CHAT_TEMPERATURE: f32 = 0.85;
pub const CHAT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_PASSWORD: &str = "BOT_PASSWORD";
pub const ENV_SYSTEM_PROMPT: &str = "SYSTEM_PROMPT";
pub const ENV_SESSION_SECRET: &str = "FLASK_SECRET_KEY";

/// Packages installed by the provisioner, in install order.
pub const PACKAGES: &[&str] = &[
    "nginx",
    "git",
    "ufw",
    "certbot",
    "python3-certbot-nginx",
    "openssl",
    "ca-certificates",
    "curl",
];

/// Everything the operator supplies for one deployment.
#[derive(Clone)]
pub struct DeploymentConfig {
    pub instance_name: String,
    pub domain: String,
    pub os_user: String,
    pub api_key: String,
    pub gate_password: String,
    pub system_prompt: String,
    pub session_secret: String,
    pub port: u16,
    /// Contact email for the certificate authority. TLS is enabled iff set.
    pub tls_email: Option<String>,
    pub require_auth_on_api: bool,
}

impl fmt::Debug for DeploymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentConfig")
            .field("instance_name", &self.instance_name)
            .field("domain", &self.domain)
            .field("os_user", &self.os_user)
            .field("api_key", &"<redacted>")
            .field("gate_password", &"<redacted>")
            .field("system_prompt", &self.system_prompt)
            .field("session_secret", &"<redacted>")
            .field("port", &self.port)
            .field("tls_email", &self.tls_email)
            .field("require_auth_on_api", &self.require_auth_on_api)
            .finish()
    }
}

/// Names end up in unit file names, nginx site names and home paths.
pub fn is_safe_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 32 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Domains are interpolated into the nginx `server_name` and the certbot
/// command line, so only host name characters are accepted.
pub fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain.len() <= 253
        && !domain.starts_with(['.', '-'])
        && !domain.ends_with(['.', '-'])
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

fn has_value(s: &str) -> bool {
    !s.trim().is_empty()
}

impl DeploymentConfig {
    pub fn tls_enabled(&self) -> bool {
        self.tls_email.is_some()
    }

    pub fn public_url(&self) -> String {
        let scheme = if self.tls_enabled() { "https" } else { "http" };
        format!("{scheme}://{}", self.domain)
    }

    /// Reject a config that would fail halfway through provisioning.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("instance name", &self.instance_name),
            ("domain", &self.domain),
            ("OS user", &self.os_user),
            ("API key", &self.api_key),
            ("gate password", &self.gate_password),
            ("system prompt", &self.system_prompt),
            ("session secret", &self.session_secret),
        ];
        for (label, value) in required {
            if !has_value(value) {
                return Err(AppError::InvalidConfig(format!("{label} must not be empty")));
            }
        }
        if !is_safe_name(&self.instance_name) {
            return Err(AppError::InvalidConfig(format!(
                "instance name '{}' may only contain letters, digits, '_' and '-'",
                self.instance_name
            )));
        }
        if !is_safe_name(&self.os_user) {
            return Err(AppError::InvalidConfig(format!(
                "OS user '{}' may only contain letters, digits, '_' and '-'",
                self.os_user
            )));
        }
        if !is_valid_domain(&self.domain) {
            return Err(AppError::InvalidConfig(format!(
                "domain '{}' is not a bare host name",
                self.domain
            )));
        }
        if self.port == 0 {
            return Err(AppError::InvalidConfig("port must be in 1-65535".into()));
        }
        if let Some(email) = &self.tls_email {
            if !has_value(email) {
                return Err(AppError::InvalidConfig(
                    "TLS email must not be empty when TLS is enabled".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Host locations the provisioner writes into. Overridable so tests can
/// redirect every write into a scratch directory.
#[derive(Debug, Clone)]
pub struct HostPaths {
    pub home_base: PathBuf,
    pub systemd_dir: PathBuf,
    pub nginx_available: PathBuf,
    pub nginx_enabled: PathBuf,
}

impl Default for HostPaths {
    fn default() -> Self {
        Self {
            home_base: PathBuf::from("/home"),
            systemd_dir: PathBuf::from("/etc/systemd/system"),
            nginx_available: PathBuf::from("/etc/nginx/sites-available"),
            nginx_enabled: PathBuf::from("/etc/nginx/sites-enabled"),
        }
    }
}

impl HostPaths {
    /// Mirror the default layout under `root`.
    pub fn under(root: &Path) -> Self {
        Self {
            home_base: root.join("home"),
            systemd_dir: root.join("etc/systemd/system"),
            nginx_available: root.join("etc/nginx/sites-available"),
            nginx_enabled: root.join("etc/nginx/sites-enabled"),
        }
    }

    pub fn project_layout(&self, cfg: &DeploymentConfig) -> ProjectLayout {
        ProjectLayout::new(self.home_base.join(&cfg.os_user).join(&cfg.instance_name))
    }

    pub fn unit_file(&self, instance_name: &str) -> PathBuf {
        self.systemd_dir.join(format!("{instance_name}.service"))
    }

    pub fn nginx_site(&self, instance_name: &str) -> PathBuf {
        self.nginx_available.join(instance_name)
    }

    pub fn nginx_enabled_link(&self, instance_name: &str) -> PathBuf {
        self.nginx_enabled.join(instance_name)
    }
}

/// The project directory tree owned by the target OS user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn env_file(&self) -> PathBuf {
        self.root.join(".env")
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join("runtime.json")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.root.join("static")
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.root.join("runtime")
    }

    pub fn runtime_bin_dir(&self) -> PathBuf {
        self.runtime_dir().join("bin")
    }

    pub fn runtime_binary(&self) -> PathBuf {
        self.runtime_bin_dir().join(BINARY_NAME)
    }

    pub fn deploy_record(&self) -> PathBuf {
        self.root.join("deploy.json")
    }

    /// Directories the skeleton step creates, parents first.
    pub fn directories(&self) -> Vec<PathBuf> {
        vec![
            self.root.clone(),
            self.templates_dir(),
            self.static_dir(),
            self.runtime_dir(),
            self.runtime_bin_dir(),
        ]
    }
}

/// Non-secret summary of a finished deployment.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeployRecord {
    pub id: String,
    pub instance_name: String,
    pub domain: String,
    pub os_user: String,
    pub port: u16,
    pub url: String,
    pub tls: bool,
    pub require_auth_on_api: bool,
    pub project_root: String,
    pub created_at: DateTime<Utc>,
}

impl DeployRecord {
    pub fn new(cfg: &DeploymentConfig, layout: &ProjectLayout) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            instance_name: cfg.instance_name.clone(),
            domain: cfg.domain.clone(),
            os_user: cfg.os_user.clone(),
            port: cfg.port,
            url: cfg.public_url(),
            tls: cfg.tls_enabled(),
            require_auth_on_api: cfg.require_auth_on_api,
            project_root: layout.root().display().to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn save(&self, layout: &ProjectLayout) -> Result<PathBuf, AppError> {
        let path = layout.deploy_record();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

#[cfg(test)]
pub(crate) fn sample_config() -> DeploymentConfig {
    DeploymentConfig {
        instance_name: "helpbot".into(),
        domain: "chat.example.com".into(),
        os_user: "botuser".into(),
        api_key: "sk-test-123".into(),
        gate_password: "open sesame".into(),
        system_prompt: "You are terse.\\nAnswer briefly.".into(),
        session_secret: "0123456789abcdef0123456789abcdef".into(),
        port: 5123,
        tls_email: None,
        require_auth_on_api: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        sample_config().validate().unwrap();
    }

    #[test]
    fn empty_required_field_is_rejected() {
        let mut cfg = sample_config();
        cfg.gate_password = "   ".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("gate password"));
    }

    #[test]
    fn unsafe_instance_name_is_rejected() {
        let mut cfg = sample_config();
        cfg.instance_name = "../etc".into();
        assert!(matches!(cfg.validate(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn tls_requires_email() {
        let mut cfg = sample_config();
        cfg.tls_email = Some(String::new());
        assert!(cfg.validate().is_err());
        cfg.tls_email = Some("ops@example.com".into());
        cfg.validate().unwrap();
        assert_eq!(cfg.public_url(), "https://chat.example.com");
    }

    #[test]
    fn domain_is_restricted_to_host_name_characters() {
        assert!(is_valid_domain("chat.example.com"));
        assert!(is_valid_domain("bot-1.example.co.uk"));
        for bad in [
            "example.com; return 444",
            "a{b}.com",
            "$host",
            "x.com/path",
            "chat example.com",
            ".example.com",
            "example.com-",
            "",
        ] {
            assert!(!is_valid_domain(bad), "accepted {bad:?}");
        }

        let mut cfg = sample_config();
        cfg.domain = "example.com;}".into();
        assert!(matches!(cfg.validate(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn safe_names() {
        assert!(is_safe_name("bot_1-a"));
        assert!(!is_safe_name("-bot"));
        assert!(!is_safe_name("bot name"));
        assert!(!is_safe_name(""));
        assert!(!is_safe_name(&"a".repeat(33)));
    }

    #[test]
    fn layout_paths_hang_off_home() {
        let paths = HostPaths::default();
        let layout = paths.project_layout(&sample_config());
        assert_eq!(layout.root(), Path::new("/home/botuser/helpbot"));
        assert_eq!(
            layout.runtime_binary(),
            PathBuf::from("/home/botuser/helpbot/runtime/bin/chatgate")
        );
        assert_eq!(
            paths.unit_file("helpbot"),
            PathBuf::from("/etc/systemd/system/helpbot.service")
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let shown = format!("{:?}", sample_config());
        assert!(!shown.contains("sk-test-123"));
        assert!(!shown.contains("open sesame"));
        assert!(shown.contains("helpbot"));
    }

    #[test]
    fn deploy_record_has_no_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let record = DeployRecord::new(&sample_config(), &layout);
        let path = record.save(&layout).unwrap();
        let json = std::fs::read_to_string(path).unwrap();
        assert!(json.contains("\"port\": 5123"));
        assert!(!json.contains("sk-test-123"));
        assert!(!json.contains("0123456789abcdef0123456789abcdef"));
    }
}
