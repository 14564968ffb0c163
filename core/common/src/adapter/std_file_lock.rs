//! プラットフォームごとの FileLock 実装
//!
//! unix は flock(2) の LOCK_EX | LOCK_NB、windows は共有モード 0 での open で判定する。

use crate::error::Error;
use crate::ports::outbound::{FileLock, LockState};
use std::fs::File;
use std::path::Path;

/// OS のロック機構を使う FileLock 実装
#[derive(Debug, Clone, Default)]
pub struct StdFileLock;

#[cfg(unix)]
impl FileLock for StdFileLock {
    fn try_exclusive_lock(&self, path: &Path) -> Result<LockState, Error> {
        use std::os::unix::io::AsRawFd;

        let file = File::open(path).map_err(|e| {
            Error::io_msg(format!("Failed to open '{}' for locking: {}", path.display(), e))
        })?;
        let fd = file.as_raw_fd();
        // SAFETY: fd は file が生きている間有効
        let rc = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
        if rc == 0 {
            // SAFETY: 同上
            unsafe { libc::flock(fd, libc::LOCK_UN) };
            return Ok(LockState::Held);
        }
        let err = std::io::Error::last_os_error();
        if err.kind() == std::io::ErrorKind::WouldBlock {
            return Ok(LockState::Busy);
        }
        Err(Error::io_msg(format!(
            "Failed to lock '{}': {}",
            path.display(),
            err
        )))
    }
}

#[cfg(windows)]
impl FileLock for StdFileLock {
    fn try_exclusive_lock(&self, path: &Path) -> Result<LockState, Error> {
        use std::os::windows::fs::OpenOptionsExt;

        const ERROR_SHARING_VIOLATION: i32 = 32;
        const ERROR_LOCK_VIOLATION: i32 = 33;

        match std::fs::OpenOptions::new()
            .read(true)
            .share_mode(0)
            .open(path)
        {
            Ok(file) => {
                drop(file);
                Ok(LockState::Held)
            }
            Err(e)
                if matches!(
                    e.raw_os_error(),
                    Some(ERROR_SHARING_VIOLATION) | Some(ERROR_LOCK_VIOLATION)
                ) =>
            {
                Ok(LockState::Busy)
            }
            Err(e) => Err(Error::io_msg(format!(
                "Failed to open '{}' for locking: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(not(any(unix, windows)))]
impl FileLock for StdFileLock {
    fn try_exclusive_lock(&self, path: &Path) -> Result<LockState, Error> {
        File::open(path).map_err(|e| {
            Error::io_msg(format!("Failed to open '{}' for locking: {}", path.display(), e))
        })?;
        Ok(LockState::Held)
    }
}
