//! Compositor-native region picker using `slurp`.
//!
//! On wlroots compositors `slurp` already draws the drag-to-select overlay,
//! so the CLI delegates interactive picking to it and only parses the
//! resulting geometry. Aborting the picker maps to the same cancellation
//! error as the in-process overlay.

use tokio::task;

use super::{SelectionError, SelectionRect};

/// Runs `slurp` and waits for the user to draw a region.
///
/// # Errors
/// [`SelectionError::Cancelled`] when the user aborts the picker,
/// [`SelectionError::Picker`] when `slurp` is missing or fails.
pub async fn pick_region() -> Result<SelectionRect, SelectionError> {
    task::spawn_blocking(|| -> Result<SelectionRect, SelectionError> {
        use std::process::{Command, Stdio};

        // `slurp` outputs geometry in the format "x,y widthxheight"
        let output = Command::new("slurp")
            .args(["-f", "%x,%y %wx%h"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| SelectionError::Picker(format!("failed to run slurp: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            // slurp reports "selection cancelled" on Escape
            if stderr.is_empty() || stderr.to_lowercase().contains("cancelled") {
                return Err(SelectionError::Cancelled);
            }
            return Err(SelectionError::Picker(format!("slurp failed: {stderr}")));
        }

        let geometry = String::from_utf8(output.stdout)
            .map_err(|e| SelectionError::Picker(format!("invalid slurp output: {e}")))?;

        log::debug!("slurp geometry: {}", geometry.trim());
        geometry.parse()
    })
    .await
    .map_err(|e| SelectionError::Picker(format!("picker task failed to join: {e}")))?
}
