use crate::commands::{chown_to, run_as, shell_escape, Shell};
use crate::generator::{sha256_file, RuntimeManifest};
use chatgate_core::{AppError, ProjectLayout};
use std::path::Path;

/// Install the runtime executable named in the manifest into the project's
/// isolated `runtime/` directory and check it runs as the target user.
pub async fn install(
    shell: &dyn Shell,
    layout: &ProjectLayout,
    user: &str,
    source: &Path,
) -> Result<(), AppError> {
    let manifest = RuntimeManifest::load(layout)?;
    let target = layout.root().join(&manifest.binary);
    let bin_dir = target
        .parent()
        .ok_or_else(|| AppError::provision("runtime install", "manifest binary has no parent"))?;
    std::fs::create_dir_all(bin_dir)?;

    // Copy beside the target and rename over it: the old binary may be
    // running under the service, and overwriting it in place fails with ETXTBSY.
    let staging = bin_dir.join(format!(".{}.new", manifest.package));
    std::fs::copy(source, &staging)
        .map_err(|e| AppError::provision("runtime install", format!("{}: {e}", source.display())))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&staging, std::fs::Permissions::from_mode(0o755))?;
    }
    std::fs::rename(&staging, &target)?;

    chown_to(shell, user, &layout.runtime_dir()).await?;

    let installed = sha256_file(&target)?;
    if installed != manifest.sha256 {
        return Err(AppError::Postcondition(format!(
            "{} checksum {installed} does not match manifest {}",
            target.display(),
            manifest.sha256
        )));
    }

    let version = run_as(
        shell,
        user,
        &format!("{} --version", shell_escape(&target.display().to_string())),
    )
    .await
    .map_err(|e| AppError::provision("runtime verify", e))?;
    tracing::info!(version = %version.trim(), "runtime installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator;
    use crate::testing::{sample_config, RecordingShell};

    async fn project(tmp: &Path) -> (ProjectLayout, std::path::PathBuf) {
        let layout = ProjectLayout::new(tmp.join("helpbot"));
        for dir in layout.directories() {
            std::fs::create_dir_all(dir).unwrap();
        }
        let exe = tmp.join("chatgate-build");
        std::fs::write(&exe, b"#!/bin/sh\necho chatgate 0.1.0\n").unwrap();
        generator::write(&RecordingShell::default(), &sample_config(), &layout, &exe)
            .await
            .unwrap();
        (layout, exe)
    }

    #[tokio::test]
    async fn installs_and_verifies_as_target_user() {
        let tmp = tempfile::tempdir().unwrap();
        let (layout, exe) = project(tmp.path()).await;
        let shell = RecordingShell::default();

        install(&shell, &layout, "botuser", &exe).await.unwrap();
        install(&shell, &layout, "botuser", &exe).await.unwrap();

        assert_eq!(
            std::fs::read(layout.runtime_binary()).unwrap(),
            std::fs::read(&exe).unwrap()
        );
        let cmds = shell.take();
        assert!(cmds
            .iter()
            .any(|c| c.starts_with("su -s /bin/sh botuser -c ") && c.contains("--version")));
    }

    #[tokio::test]
    async fn mismatched_binary_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let (layout, _exe) = project(tmp.path()).await;
        let other = tmp.path().join("other");
        std::fs::write(&other, b"something else").unwrap();

        let err = install(&RecordingShell::default(), &layout, "botuser", &other)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Postcondition(_)));
    }
}
