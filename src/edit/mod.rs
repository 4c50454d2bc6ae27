//! Editor session: round-trip a buffer through an external editor.
//!
//! The buffer is written into a fresh temporary directory, the editor is
//! run against that file until it exits, and the file is read back. The
//! file and its directory are removed before [`edit`] returns, whatever
//! the outcome.

mod launcher;
mod session;

use std::io;
use std::path::Path;
use std::time::Duration;

pub use launcher::ExternalEditor;
use session::EditSession;

/// Editor session errors.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// The editor could not be spawned or exited unsuccessfully.
    #[error("editor: {0}")]
    Launch(String),

    #[error("temporary file: {context}: {source}")]
    TempIo {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("editor interrupted")]
    Interrupted,

    #[error("editor did not exit within {0:?}")]
    TimedOut(Duration),
}

impl EditError {
    fn temp_io(context: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::TempIo { context, source }
    }
}

/// Runs an editor against a file and waits for it to exit.
pub trait EditorLauncher {
    async fn launch(&self, path: &Path) -> Result<(), EditError>;
}

/// Edit `initial` in the editor, using a temp file ending in `extension`.
///
/// Returns the file's contents after the editor exits. Launch failures
/// skip the read-back. Cleanup always runs; a cleanup failure is logged
/// and does not discard an already read result.
pub async fn edit<L: EditorLauncher>(
    launcher: &L,
    initial: &[u8],
    extension: &str,
) -> Result<Vec<u8>, EditError> {
    let session = EditSession::create(initial, extension)?;
    tracing::info!(path = %session.path().display(), bytes = initial.len(), "editing");

    let outcome = session.run(launcher).await;
    settle(outcome, session.dispose())
}

/// Combine the editor outcome with the cleanup result. A failed cleanup
/// is reported as a warning and never replaces the outcome.
fn settle(
    outcome: Result<Vec<u8>, EditError>,
    cleanup: io::Result<()>,
) -> Result<Vec<u8>, EditError> {
    if let Err(e) = cleanup {
        tracing::warn!(error = %e, "removing temporary edit files failed");
        eprintln!("warning: removing temporary edit files failed: {e}");
    }
    outcome
}
