use crate::commands::{chown_to, Shell};
use chatgate_core::{AppError, ProjectLayout};

/// Create the project tree and hand it to the target user.
pub async fn create(shell: &dyn Shell, layout: &ProjectLayout, user: &str) -> Result<(), AppError> {
    for dir in layout.directories() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            AppError::provision("project directories", format!("{}: {e}", dir.display()))
        })?;
    }
    chown_to(shell, user, layout.root()).await?;

    if let Some(missing) = layout.directories().into_iter().find(|d| !d.is_dir()) {
        return Err(AppError::Postcondition(format!(
            "{} was not created",
            missing.display()
        )));
    }
    Ok(())
}
