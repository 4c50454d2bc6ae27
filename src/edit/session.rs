//! Scoped temporary file for one edit.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::{EditError, EditorLauncher};

const DIR_PREFIX: &str = "diva-edit-";
const FILE_STEM: &str = "text";

/// A uniquely named temp directory holding the single file being edited.
///
/// Dropping the session removes the directory as a fallback; the normal
/// path is [`EditSession::dispose`], which reports removal errors.
pub(super) struct EditSession {
    dir: TempDir,
    path: PathBuf,
}

impl EditSession {
    /// Create the directory and write `initial` to `text<extension>`.
    ///
    /// On failure the partially created directory is dropped and removed.
    pub(super) fn create(initial: &[u8], extension: &str) -> Result<Self, EditError> {
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir()
            .map_err(EditError::temp_io("creating directory"))?;

        let path = dir.path().join(format!("{FILE_STEM}{extension}"));

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&path)
            .map_err(EditError::temp_io("creating file"))?;
        file.write_all(initial)
            .and_then(|()| file.sync_all())
            .map_err(EditError::temp_io("writing file"))?;

        Ok(Self { dir, path })
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    /// Run the editor, then read the file back if it exited cleanly.
    pub(super) async fn run<L: EditorLauncher>(&self, launcher: &L) -> Result<Vec<u8>, EditError> {
        launcher.launch(&self.path).await?;
        tokio::fs::read(&self.path)
            .await
            .map_err(EditError::temp_io("reading file back"))
    }

    /// Remove the file, then the directory.
    pub(super) fn dispose(self) -> io::Result<()> {
        let Self { dir, path } = self;
        match fs::remove_file(&path) {
            Ok(()) => {}
            // The editor may have replaced or deleted it.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        dir.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn create_writes_owner_only_file() {
        let session = EditSession::create(b"secret", ".txt").unwrap();

        assert_eq!(fs::read(session.path()).unwrap(), b"secret");
        let mode = fs::metadata(session.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        session.dispose().unwrap();
    }

    #[test]
    fn dispose_removes_file_and_dir() {
        let session = EditSession::create(b"x", ".md").unwrap();
        let path = session.path().to_path_buf();
        let dir = path.parent().unwrap().to_path_buf();

        session.dispose().unwrap();

        assert!(!path.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn dispose_tolerates_deleted_file() {
        let session = EditSession::create(b"x", ".txt").unwrap();
        let dir = session.path().parent().unwrap().to_path_buf();
        fs::remove_file(session.path()).unwrap();

        session.dispose().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn dispose_removes_editor_leftovers() {
        let session = EditSession::create(b"x", ".txt").unwrap();
        let dir = session.path().parent().unwrap().to_path_buf();
        // Swap files some editors drop next to the file being edited.
        fs::write(dir.join(".text.txt.swp"), b"swap").unwrap();

        session.dispose().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn drop_removes_dir() {
        let session = EditSession::create(b"x", ".txt").unwrap();
        let dir = session.path().parent().unwrap().to_path_buf();
        drop(session);
        assert!(!dir.exists());
    }

    #[test]
    fn invalid_extension_fails_without_leaking() {
        // A path separator in the extension points into a missing subdir.
        let err = EditSession::create(b"x", "/nested/.txt").err().unwrap();
        assert!(matches!(err, EditError::TempIo { .. }));
    }
}
