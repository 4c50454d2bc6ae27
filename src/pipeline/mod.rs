//! Capture → edit → restore pipeline.
//!
//! One linear run:
//!
//! 1. identify the focused window (id, owning process, title),
//! 2. select-all + copy into the clipboard,
//! 3. read the clipboard (empty buffer if that fails),
//! 4. classify the window to pick an extension hint,
//! 5. edit the buffer in the external editor,
//! 6. write the result back to the clipboard,
//! 7. re-activate the window and optionally send trailing (paste) keys.
//!
//! An edit failure still re-activates the window before it is reported,
//! so the user is not left looking at whatever the editor uncovered.

use std::time::Duration;

use crate::classify::{self, DEFAULT_EXTENSION, ExtensionRule};
use crate::edit::{self, EditError, EditorLauncher};
use crate::platform::{ClipboardProvider, PlatformError, WindowControl, WindowHandle};

/// Pipeline errors, one per failing stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("unable to identify current window: {0}")]
    Identify(#[source] PlatformError),

    #[error("copying text from window {window} failed: {source}")]
    Copy {
        window: WindowHandle,
        source: PlatformError,
    },

    /// The edit failed; the window was re-activated successfully.
    #[error("editing clipboard failed: {source} (switched back to window {window})")]
    Edit {
        window: WindowHandle,
        source: EditError,
    },

    /// The edit failed and re-activating the window failed as well.
    #[error(
        "editing clipboard failed: {edit}; switching back to window {window} failed: {restore}"
    )]
    EditAndRestore {
        window: WindowHandle,
        edit: EditError,
        restore: PlatformError,
    },

    #[error("writing clipboard failed: {0}")]
    WriteClipboard(#[source] PlatformError),

    #[error("switching back to window {window} failed: {source}")]
    Restore {
        window: WindowHandle,
        source: PlatformError,
    },

    /// Trailing keys failed; the clipboard already holds the edited text.
    #[error("sending keys to window {window} failed: {source} (edited text is on the clipboard)")]
    Paste {
        window: WindowHandle,
        source: PlatformError,
    },
}

/// The window the pipeline operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub window: WindowHandle,
    pub pid: u32,
    pub executable: String,
    pub title: String,
}

/// Identify the focused window and its owning process.
pub async fn identify<W: WindowControl>(control: &W) -> Result<Target, PlatformError> {
    let window = control.current_window().await?;
    let process = control.resolve_process(&window).await?;
    let title = control.title(&window).await?;

    Ok(Target {
        window,
        pid: process.pid,
        executable: process.executable,
        title,
    })
}

/// Pipeline tuning: the extension table and the trailing key sequence.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Rules evaluated in order; ignored when `extension_hint` is off.
    pub rules: Vec<ExtensionRule>,
    pub extension_hint: bool,
    /// Keys sent after the window is re-activated, e.g. `ctrl+v`.
    pub trailing_keys: Vec<String>,
    /// Pause between trailing keys.
    pub key_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules: classify::builtin_rules(),
            extension_hint: true,
            trailing_keys: Vec::new(),
            key_delay: Duration::ZERO,
        }
    }
}

impl PipelineConfig {
    /// Extension for `target`'s temp file.
    pub fn extension_for(&self, target: &Target) -> &str {
        if self.extension_hint {
            classify::classify(&target.executable, &target.title, &self.rules)
        } else {
            DEFAULT_EXTENSION
        }
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub target: Target,
    pub extension: String,
    /// Size of the edited buffer written to the clipboard.
    pub bytes: usize,
    pub sent_trailing_keys: bool,
}

/// The orchestrator, wired to its window, clipboard, and editor services.
pub struct Pipeline<W, C, L> {
    window: W,
    clipboard: C,
    editor: L,
    config: PipelineConfig,
}

impl<W, C, L> Pipeline<W, C, L>
where
    W: WindowControl,
    C: ClipboardProvider,
    L: EditorLauncher,
{
    pub fn new(window: W, clipboard: C, editor: L, config: PipelineConfig) -> Self {
        Self {
            window,
            clipboard,
            editor,
            config,
        }
    }

    /// Run the whole pipeline once.
    pub async fn run(&self) -> Result<Summary, PipelineError> {
        let target = identify(&self.window)
            .await
            .map_err(PipelineError::Identify)?;
        let window = &target.window;

        tracing::info!(
            window = %window,
            pid = target.pid,
            executable = %target.executable,
            title = %target.title,
            "identified target window"
        );

        self.window
            .simulate_copy(window)
            .await
            .map_err(|source| PipelineError::Copy {
                window: window.clone(),
                source,
            })?;

        let initial = self.capture().await;
        let extension = self.config.extension_for(&target).to_string();
        tracing::debug!(extension = %extension, "classified window");

        let edited = match edit::edit(&self.editor, &initial, &extension).await {
            Ok(edited) => edited,
            Err(failed) => {
                tracing::warn!(error = %failed, window = %window, "edit failed, switching back");
                return Err(match self.window.activate(window).await {
                    Ok(()) => PipelineError::Edit {
                        window: window.clone(),
                        source: failed,
                    },
                    Err(restore) => PipelineError::EditAndRestore {
                        window: window.clone(),
                        edit: failed,
                        restore,
                    },
                });
            }
        };

        if let Err(e) = self.clipboard.write(&edited).await {
            if let Err(restore) = self.window.activate(window).await {
                tracing::warn!(error = %restore, window = %window, "switching back failed");
            }
            return Err(PipelineError::WriteClipboard(e));
        }

        self.window
            .activate(window)
            .await
            .map_err(|source| PipelineError::Restore {
                window: window.clone(),
                source,
            })?;

        let sent_trailing_keys = !self.config.trailing_keys.is_empty();
        if sent_trailing_keys {
            self.window
                .simulate_keys(window, &self.config.trailing_keys, self.config.key_delay)
                .await
                .map_err(|source| PipelineError::Paste {
                    window: window.clone(),
                    source,
                })?;
        }

        tracing::info!(window = %window, bytes = edited.len(), "edit complete");

        Ok(Summary {
            extension,
            bytes: edited.len(),
            sent_trailing_keys,
            target,
        })
    }

    /// Read the copied text; an unreadable clipboard means starting empty.
    async fn capture(&self) -> Vec<u8> {
        match self.clipboard.read().await {
            Ok(buf) => buf,
            Err(e) => {
                tracing::warn!(error = %e, "unable to get clipboard, using empty buffer");
                eprintln!("unable to get clipboard, using empty buffer: {e}");
                Vec::new()
            }
        }
    }
}
