use crate::commands::Shell;
use async_trait::async_trait;
use chatgate_core::{AppError, DeploymentConfig};
use std::sync::Mutex;

/// Records every command and succeeds unless the command contains `fail_on`.
#[derive(Default)]
pub struct RecordingShell {
    pub commands: Mutex<Vec<String>>,
    pub fail_on: Option<String>,
}

impl RecordingShell {
    pub fn failing_on(pattern: &str) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            fail_on: Some(pattern.to_string()),
        }
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.commands.lock().unwrap())
    }
}

#[async_trait]
impl Shell for RecordingShell {
    async fn run(&self, cmd: &str) -> Result<String, AppError> {
        self.commands.lock().unwrap().push(cmd.to_string());
        match &self.fail_on {
            Some(pattern) if cmd.contains(pattern.as_str()) => Err(AppError::CommandFailed {
                command: cmd.to_string(),
                status: "exit status: 1".into(),
                stderr: "simulated failure".into(),
            }),
            _ => Ok(String::new()),
        }
    }
}

pub fn sample_config() -> DeploymentConfig {
    DeploymentConfig {
        instance_name: "helpbot".into(),
        domain: "chat.example.com".into(),
        os_user: "botuser".into(),
        api_key: "sk-test".into(),
        gate_password: "hunter2".into(),
        system_prompt: "Be brief.".into(),
        session_secret: "00112233445566778899aabbccddeeff".into(),
        port: 5050,
        tls_email: None,
        require_auth_on_api: false,
    }
}
