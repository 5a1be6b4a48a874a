use crate::commands::Shell;
use chatgate_core::AppError;

/// Create the target OS user unless it already exists.
pub async fn ensure(shell: &dyn Shell, user: &str) -> Result<(), AppError> {
    shell
        .run(&format!(
            "id -u {user} >/dev/null 2>&1 || adduser --disabled-password --gecos \"\" {user}"
        ))
        .await
        .map_err(|e| AppError::provision("user creation", e))?;

    shell
        .run(&format!("id -u {user}"))
        .await
        .map_err(|_| AppError::Postcondition(format!("user '{user}' does not exist")))?;
    Ok(())
}
