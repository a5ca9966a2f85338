//! Process Lock File Module
//!
//! Keeps two registry processes from opening the same data directory. Sled
//! takes its own file lock, but fails with an opaque error; this gives the
//! operator the PID and the stale-lock remedy instead.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("lock file I/O error ({0}): {1}")]
    Io(PathBuf, std::io::Error),
    #[error(
        "another well-registry process is using this data directory (PID: {pid})\n\
         If no other process is running, remove the stale lock file: rm {path:?}"
    )]
    Held { pid: u32, path: PathBuf },
}

/// Process lock file manager
///
/// Writes the current PID into `<data_dir>/.well_registry.lock` and removes
/// the file on drop.
#[derive(Debug)]
pub struct ProcessLock {
    lock_path: PathBuf,
    owned: bool,
}

impl ProcessLock {
    const LOCK_FILE_NAME: &'static str = ".well_registry.lock";

    /// Acquire the lock for `data_dir`, creating the directory if needed.
    ///
    /// A lock left behind by a process that is no longer running is removed.
    pub fn acquire<P: AsRef<Path>>(data_dir: P) -> Result<Self, LockError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir).map_err(|e| LockError::Io(data_dir.to_path_buf(), e))?;

        let lock_path = data_dir.join(Self::LOCK_FILE_NAME);

        if lock_path.exists() {
            match Self::holder_pid(&lock_path) {
                Some(pid) if Self::is_process_running(pid) => {
                    return Err(LockError::Held {
                        pid,
                        path: lock_path,
                    });
                }
                _ => {
                    tracing::info!(path = ?lock_path, "Removing stale lock file");
                    match fs::remove_file(&lock_path) {
                        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                            return Err(LockError::Io(lock_path, e));
                        }
                        _ => {}
                    }
                }
            }
        }

        let pid = std::process::id();
        let mut file = Self::create_exclusive(&lock_path)?;
        writeln!(file, "{pid}").map_err(|e| LockError::Io(lock_path.clone(), e))?;

        tracing::debug!(pid, path = ?lock_path, "Acquired process lock");

        Ok(Self {
            lock_path,
            owned: true,
        })
    }

    /// Create the lock file, failing if another process created it first.
    fn create_exclusive(lock_path: &Path) -> Result<File, LockError> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(lock_path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => LockError::Held {
                    // The winner may not have written its PID yet
                    pid: Self::holder_pid(lock_path).unwrap_or_default(),
                    path: lock_path.to_path_buf(),
                },
                _ => LockError::Io(lock_path.to_path_buf(), e),
            })
    }

    /// PID recorded in an existing lock file; `None` if unreadable
    fn holder_pid(lock_path: &Path) -> Option<u32> {
        fs::read_to_string(lock_path).ok()?.trim().parse().ok()
    }

    #[cfg(unix)]
    fn is_process_running(pid: u32) -> bool {
        // Only count it as held if the PID still belongs to a registry process
        fs::read_to_string(format!("/proc/{pid}/cmdline"))
            .map(|cmdline| cmdline.contains("well-registry") || cmdline.contains("well_registry"))
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    fn is_process_running(_pid: u32) -> bool {
        true
    }

    /// Release the lock (called automatically on drop)
    pub fn release(&mut self) {
        if self.owned {
            if let Err(e) = fs::remove_file(&self.lock_path) {
                tracing::warn!("Failed to remove lock file: {}", e);
            } else {
                tracing::debug!(path = ?self.lock_path, "Released process lock");
            }
            self.owned = false;
        }
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for ProcessLock {
    fn drop(&mut self) {
        self.release();
    }
}
