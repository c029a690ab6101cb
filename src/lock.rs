use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

pub const LOCK_FILE_NAME: &str = ".aeronull.lock";

/// Workspace-scoped session lock that removes the lock file on drop.
#[derive(Debug)]
pub struct SessionLock {
    file: File,
    path: PathBuf,
}

impl SessionLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        // Best-effort unlock; ignore errors
        let _ = self.file.unlock();
        let _ = fs::remove_file(&self.path);
    }
}

/// Acquire the non-blocking exclusive lock below a workspace root.
pub fn acquire_session_lock(root: &Path) -> io::Result<SessionLock> {
    acquire_lock_at(&root.join(LOCK_FILE_NAME))
}

/// Acquire a lock at a specific path.
#[tracing::instrument(level = "debug", err)]
pub fn acquire_lock_at(p: &Path) -> io::Result<SessionLock> {
    if let Some(parent) = p.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(true)
        .open(p)?;
    match f.try_lock_exclusive() {
        Ok(_) => Ok(SessionLock {
            file: f,
            path: p.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(io::Error::other(format!(
            "Another AeroNull session is already running (lock held at {}). Please try again later.",
            p.display()
        ))),
        Err(e) => Err(e),
    }
}
