use async_trait::async_trait;
use chatgate_core::AppError;
use std::path::Path;
use tokio::process::Command;

/// Something that can run a shell command line and hand back its stdout.
#[async_trait]
pub trait Shell: Send + Sync {
    async fn run(&self, cmd: &str) -> Result<String, AppError>;
}

/// Runs commands on this host via `sh -c`, as the invoking (root) user.
pub struct HostShell;

#[async_trait]
impl Shell for HostShell {
    async fn run(&self, cmd: &str) -> Result<String, AppError> {
        tracing::debug!(command = %cmd, "running");
        let output = Command::new("sh").arg("-c").arg(cmd).output().await?;

        if !output.status.success() {
            return Err(AppError::CommandFailed {
                command: cmd.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Execute a command as `user` via `su`, so files it creates belong to that user.
pub async fn run_as(shell: &dyn Shell, user: &str, cmd: &str) -> Result<String, AppError> {
    let wrapped = format!("su -s /bin/sh {user} -c {}", shell_escape(cmd));
    shell.run(&wrapped).await
}

/// Recursively hand `path` over to `user`.
pub async fn chown_to(shell: &dyn Shell, user: &str, path: &Path) -> Result<(), AppError> {
    let cmd = format!(
        "chown -R {user}:{user} {}",
        shell_escape(&path.display().to_string())
    );
    shell.run(&cmd).await?;
    Ok(())
}

/// Shell-escape a string for use as a single word.
pub fn shell_escape(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingShell;

    #[test]
    fn escapes_single_quotes() {
        assert_eq!(shell_escape("it's"), r"'it'\''s'");
    }

    #[tokio::test]
    async fn run_as_wraps_in_su() {
        let shell = RecordingShell::default();
        run_as(&shell, "botuser", "echo 'hi'").await.unwrap();
        assert_eq!(
            shell.take(),
            vec![r"su -s /bin/sh botuser -c 'echo '\''hi'\'''".to_string()]
        );
    }

    #[tokio::test]
    async fn host_shell_reports_failures() {
        let err = HostShell.run("echo oops >&2; exit 3").await.unwrap_err();
        match err {
            AppError::CommandFailed { stderr, .. } => assert_eq!(stderr, "oops"),
            other => panic!("unexpected error: {other}"),
        }
        let out = HostShell.run("printf hello").await.unwrap();
        assert_eq!(out, "hello");
    }
}
