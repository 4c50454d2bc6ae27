//! Platform adapters: window control and clipboard behind traits.
//!
//! Everything that touches process-wide desktop state (input focus, key
//! repeat, the system clipboard) goes through [`WindowControl`] or
//! [`ClipboardProvider`]. The pipeline receives both as injected
//! services; the X11 implementations live in [`x11`].

pub mod command;
pub mod procfs;
pub mod x11;

#[cfg(test)]
pub mod fake;

use std::fmt;
use std::time::Duration;

/// Key sequence that selects everything in the focused widget and copies it.
pub const COPY_KEYS: [&str; 2] = ["ctrl+a", "ctrl+c"];

/// Errors returned by platform adapters.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// No window holds input focus, or the display is unreachable.
    #[error("no active window: {0}")]
    NoActiveWindow(String),

    /// The window's PID or the PID's executable could not be resolved.
    #[error("process lookup: {0}")]
    ProcessLookup(String),

    #[error("title lookup: {0}")]
    TitleLookup(String),

    /// Synthetic key events could not be delivered, or key repeat could
    /// not be restored afterwards.
    #[error("key injection: {0}")]
    InputInjection(String),

    /// The window could not be raised and focused (e.g. it was closed).
    #[error("activation: {0}")]
    Activation(String),

    /// Clipboard operation failed (e.g. xclip not found, pipe error).
    #[error("clipboard: {0}")]
    Clipboard(String),
}

/// Opaque identifier of a window, valid for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowHandle(String);

impl WindowHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the owning process of a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwningProcess {
    pub pid: u32,
    pub executable: String,
}

/// Queries and manipulates window focus and injects synthetic keys.
///
/// All side effects are global to the desktop session. Callers must not
/// run two pipelines at once.
pub trait WindowControl {
    /// The window currently holding input focus.
    async fn current_window(&self) -> Result<WindowHandle, PlatformError>;

    /// The process owning `window` and that process's executable name.
    async fn resolve_process(&self, window: &WindowHandle) -> Result<OwningProcess, PlatformError>;

    async fn title(&self, window: &WindowHandle) -> Result<String, PlatformError>;

    /// Raise and focus `window`, returning only once the switch completed.
    async fn activate(&self, window: &WindowHandle) -> Result<(), PlatformError>;

    /// Send `keys` to `window` in order, pausing `delay` between keys.
    ///
    /// Key repeat is disabled for the duration and re-enabled afterwards
    /// on every path.
    async fn simulate_keys(
        &self,
        window: &WindowHandle,
        keys: &[String],
        delay: Duration,
    ) -> Result<(), PlatformError>;

    /// Select-all + copy, so the window's text lands in the clipboard.
    async fn simulate_copy(&self, window: &WindowHandle) -> Result<(), PlatformError> {
        let keys: Vec<String> = COPY_KEYS.iter().map(|k| k.to_string()).collect();
        self.simulate_keys(window, &keys, Duration::ZERO).await
    }
}

/// Reads and writes the system clipboard as an opaque byte buffer.
///
/// Both operations replace or return the whole buffer. No retries.
pub trait ClipboardProvider {
    async fn read(&self) -> Result<Vec<u8>, PlatformError>;

    async fn write(&self, content: &[u8]) -> Result<(), PlatformError>;
}
