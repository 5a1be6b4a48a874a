use crate::llm::ChatClient;
use crate::session::SessionSigner;
use chatgate_core::config::{ENV_API_KEY, ENV_PASSWORD, ENV_SESSION_SECRET, ENV_SYSTEM_PROMPT};
use chatgate_core::{envfile, AppError, ProjectLayout};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a request handler needs, loaded once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub gate_password: String,
    pub system_prompt: String,
    pub session_secret: String,
    pub model: String,
    pub require_auth_on_api: bool,
    pub chat_page: String,
    pub login_page: String,
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Read the secrets file and page templates from a generated project.
    pub fn load(
        layout: &ProjectLayout,
        model: &str,
        require_auth_on_api: bool,
    ) -> Result<Self, AppError> {
        let env_file = layout.env_file();
        let mut vars = envfile::read(&env_file)?;
        let mut take = |key: &str| {
            vars.remove(key).filter(|v| !v.is_empty()).ok_or_else(|| {
                AppError::InvalidConfig(format!("{key} missing from {}", env_file.display()))
            })
        };
        let api_key = take(ENV_API_KEY)?;
        let gate_password = take(ENV_PASSWORD)?;
        let system_prompt = take(ENV_SYSTEM_PROMPT)?;
        let session_secret = take(ENV_SESSION_SECRET)?;

        let templates = layout.templates_dir();
        let chat_page = std::fs::read_to_string(templates.join("chat.html"))?;
        let login_page = std::fs::read_to_string(templates.join("login.html"))?;

        Ok(Self {
            api_key,
            gate_password,
            system_prompt,
            session_secret,
            model: model.to_string(),
            require_auth_on_api,
            chat_page,
            login_page,
            static_dir: layout.static_dir(),
        })
    }

    pub fn login_page_with(&self, error: &str) -> String {
        self.login_page.replace("{{ error }}", error)
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub signer: SessionSigner,
    pub chat: Arc<dyn ChatClient>,
}

impl AppState {
    pub fn new(config: AppConfig, chat: Arc<dyn ChatClient>) -> Arc<Self> {
        let signer = SessionSigner::new(&config.session_secret);
        Arc::new(Self {
            config,
            signer,
            chat,
        })
    }
}
