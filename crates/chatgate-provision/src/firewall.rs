use crate::commands::Shell;
use chatgate_core::AppError;

/// Allow SSH and nginx's HTTP/HTTPS profile, then force-enable UFW.
pub async fn configure(shell: &dyn Shell) -> Result<(), AppError> {
    for cmd in [
        "ufw allow OpenSSH",
        "ufw allow 'Nginx Full'",
        "ufw --force enable",
    ] {
        shell
            .run(cmd)
            .await
            .map_err(|e| AppError::provision("firewall", e))?;
    }

    shell
        .run("ufw status | grep -q 'Status: active'")
        .await
        .map_err(|_| AppError::Postcondition("ufw is not active".into()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingShell;

    #[tokio::test]
    async fn ssh_is_allowed_before_enabling() {
        let shell = RecordingShell::default();
        configure(&shell).await.unwrap();
        let cmds = shell.take();
        let ssh = cmds.iter().position(|c| c.contains("OpenSSH")).unwrap();
        let enable = cmds.iter().position(|c| c == "ufw --force enable").unwrap();
        assert!(ssh < enable);
        assert!(cmds.iter().any(|c| c.contains("'Nginx Full'")));
    }
}
