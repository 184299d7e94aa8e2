use anyhow::Result;
use std::path::Path;

/// Create the downloads directory if it does not exist yet.
///
/// Idempotent; concurrent invocations racing on the same directory are
/// harmless since pre-existing directories are not an error.
pub fn ensure_downloads_dir(dir: &Path) -> Result<()> {
    fs_err::create_dir_all(dir)?;
    Ok(())
}

/// Check if a command is available in PATH
pub async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
