//! Window activation and synthetic key injection via `xdotool`.
//!
//! Key repeat is switched off with `xset r off` while keys are sent and
//! switched back on afterwards, whatever happened in between.

use std::time::Duration;

use crate::platform::PlatformError;
use crate::platform::WindowHandle;
use crate::platform::command::{CommandRunner, ExternalCommand};

/// Sends activation requests and key events through `xdotool`.
pub struct XdotoolInput<R> {
    runner: R,
}

impl<R: CommandRunner> XdotoolInput<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// `xdotool windowactivate --sync <id>`; blocks until the switch is done.
    pub async fn activate(&self, window: &WindowHandle) -> Result<(), PlatformError> {
        let cmd = ExternalCommand::new("xdotool").args(["windowactivate", "--sync", window.as_str()]);
        tracing::info!(window = %window, "activating window");
        self.run_checked(&cmd).await.map_err(PlatformError::Activation)
    }

    /// Send each key to `window`, pausing `delay` between keys.
    ///
    /// Key repeat is re-enabled on every path. If sending failed, that
    /// error wins and a failed re-enable is only logged.
    pub async fn send_keys(
        &self,
        window: &WindowHandle,
        keys: &[String],
        delay: Duration,
    ) -> Result<(), PlatformError> {
        let injected = self.inject(window, keys, delay).await;
        let restored = self.set_key_repeat(true).await;

        match (injected, restored) {
            (Err(e), Err(restore)) => {
                tracing::warn!(error = %restore, "re-enabling key repeat failed");
                Err(PlatformError::InputInjection(e))
            }
            (Err(e), Ok(())) => Err(PlatformError::InputInjection(e)),
            (Ok(()), Err(restore)) => Err(PlatformError::InputInjection(format!(
                "re-enabling key repeat: {restore}"
            ))),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    async fn inject(
        &self,
        window: &WindowHandle,
        keys: &[String],
        delay: Duration,
    ) -> Result<(), String> {
        self.set_key_repeat(false)
            .await
            .map_err(|e| format!("disabling key repeat: {e}"))?;

        for (i, key) in keys.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let cmd = ExternalCommand::new("xdotool").args([
                "key",
                "--clearmodifiers",
                "--window",
                window.as_str(),
                key.as_str(),
            ]);
            tracing::debug!(window = %window, key = %key, "sending key");
            self.run_checked(&cmd).await?;
        }

        Ok(())
    }

    async fn set_key_repeat(&self, enabled: bool) -> Result<(), String> {
        let cmd = ExternalCommand::new("xset").args(["r", if enabled { "on" } else { "off" }]);
        self.run_checked(&cmd).await
    }

    /// Run a command and fold spawn errors and non-zero exits into one message.
    async fn run_checked(&self, cmd: &ExternalCommand) -> Result<(), String> {
        let output = self
            .runner
            .run(cmd)
            .await
            .map_err(|e| format!("failed to spawn {}: {e}", cmd.program))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(format!("`{cmd}` exited with status {}", output.status))
        }
    }
}
