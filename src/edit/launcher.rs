//! External editor process.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::{EditError, EditorLauncher};

/// An editor program run in the foreground against the temp file.
///
/// The file path is appended after `args`. The editor must not fork into
/// the background (e.g. `gvim -f`), otherwise it "exits" before the user
/// is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    pub program: String,
    pub args: Vec<String>,
    /// Kill the editor if it is still running after this long.
    pub timeout: Option<Duration>,
}

impl ExternalEditor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl EditorLauncher for ExternalEditor {
    async fn launch(&self, path: &Path) -> Result<(), EditError> {
        tracing::debug!(
            editor = %self.program,
            args = ?self.args,
            path = %path.display(),
            "launching editor"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EditError::Launch(format!("failed to spawn {}: {e}", self.program)))?;

        let deadline = async {
            match self.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        let status = tokio::select! {
            status = child.wait() => status
                .map_err(|e| EditError::Launch(format!("failed to wait for {}: {e}", self.program)))?,
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!(editor = %self.program, "interrupted, killing editor");
                kill(&mut child).await;
                return Err(EditError::Interrupted);
            }
            _ = deadline => {
                tracing::warn!(editor = %self.program, "timed out, killing editor");
                kill(&mut child).await;
                return Err(EditError::TimedOut(self.timeout.unwrap_or_default()));
            }
        };

        if status.success() {
            Ok(())
        } else {
            Err(EditError::Launch(format!(
                "{} exited with status {status}",
                self.program
            )))
        }
    }
}

async fn kill(child: &mut tokio::process::Child) {
    if let Err(e) = child.kill().await {
        tracing::debug!(error = %e, "killing editor failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `sh -c SCRIPT FILE` runs SCRIPT with `$0` set to the temp file.
    fn shell(script: &str) -> ExternalEditor {
        ExternalEditor::new("sh", vec!["-c".into(), script.into()])
    }

    #[tokio::test]
    async fn successful_editor_modifies_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.md");
        std::fs::write(&path, b"hello").unwrap();

        shell(r#"printf ' world' >> "$0""#).launch(&path).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn non_zero_exit_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.txt");
        std::fs::write(&path, b"").unwrap();

        let err = shell("exit 3").launch(&path).await.unwrap_err();
        match err {
            EditError::Launch(msg) => assert!(msg.contains("exited with status")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_editor_is_launch_error() {
        let editor = ExternalEditor::new("diva-no-such-editor", Vec::new());
        let err = editor.launch(Path::new("/tmp/unused")).await.unwrap_err();
        match err {
            EditError::Launch(msg) => assert!(msg.contains("failed to spawn")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn hung_editor_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.txt");
        std::fs::write(&path, b"").unwrap();

        let editor = shell("sleep 30").with_timeout(Some(Duration::from_millis(50)));
        let err = editor.launch(&path).await.unwrap_err();

        assert!(matches!(err, EditError::TimedOut(d) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn edit_round_trip_through_real_editor() {
        let out = crate::edit::edit(&shell("true"), b"unchanged\n", ".txt")
            .await
            .unwrap();
        assert_eq!(out, b"unchanged\n");
    }
}
