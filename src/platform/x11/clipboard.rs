//! X11 clipboard provider: read/write via `xclip`.
//!
//! Wraps `xclip -selection clipboard` for clipboard access. The whole
//! buffer is read or replaced in one call.

use crate::platform::command::{CommandRunner, ExternalCommand};
use crate::platform::{ClipboardProvider, PlatformError};

/// X11 implementation of `ClipboardProvider` via `xclip`.
pub struct XclipClipboard<R> {
    runner: R,
}

impl<R: CommandRunner> XclipClipboard<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> ClipboardProvider for XclipClipboard<R> {
    async fn read(&self) -> Result<Vec<u8>, PlatformError> {
        let cmd = ExternalCommand::new("xclip")
            .args(["-selection", "clipboard", "-o"])
            .capture_stdout();

        let output = self
            .runner
            .run(&cmd)
            .await
            .map_err(|e| PlatformError::Clipboard(format!("failed to spawn xclip -o: {e}")))?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(PlatformError::Clipboard(format!(
                "xclip -o exited with status {}",
                output.status
            )))
        }
    }

    async fn write(&self, content: &[u8]) -> Result<(), PlatformError> {
        let cmd = ExternalCommand::new("xclip")
            .args(["-selection", "clipboard"])
            .stdin(content);

        let output = self
            .runner
            .run(&cmd)
            .await
            .map_err(|e| PlatformError::Clipboard(format!("failed to run xclip: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(PlatformError::Clipboard(format!(
                "xclip exited with status {}",
                output.status
            )))
        }
    }
}
