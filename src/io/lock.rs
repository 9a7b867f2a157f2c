//! Lock file for single-instance enforcement of `nightclock run`.
//!
//! The lock lives in `$XDG_RUNTIME_DIR` (or `/tmp`) and holds the owner's PID on the
//! first line and its config directory (possibly empty) on the second.

use anyhow::{Context, Result};
use fs2::FileExt;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config;

/// Held lock. Dropping it unlocks and removes the file.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Default lock file location.
pub fn default_lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("nightclock.lock")
}

/// Try to become the single running instance.
///
/// Returns `Ok(None)` with the owner's PID logged when another live instance holds
/// the lock. Stale locks left by dead processes are taken over.
pub fn acquire_lock(lock_path: &Path) -> Result<Option<InstanceLock>> {
    let file = open_lock_file(lock_path)?;

    if file.try_lock_exclusive().is_err() {
        match read_owner_pid(lock_path) {
            Some(pid) if is_process_running(pid) => {
                log_pipe!();
                log_warning!("nightclock is already running (PID {})", pid);
                return Ok(None);
            }
            _ => {
                log_warning!("Removing stale lock file: {}", lock_path.display());
                let _ = std::fs::remove_file(lock_path);
            }
        }

        let file = open_lock_file(lock_path)?;
        if file.try_lock_exclusive().is_err() {
            anyhow::bail!(
                "Failed to acquire lock after removing stale file {}",
                lock_path.display()
            );
        }
        return write_owner(file, lock_path).map(Some);
    }

    write_owner(file, lock_path).map(Some)
}

fn open_lock_file(lock_path: &Path) -> Result<File> {
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .with_context(|| format!("Failed to open lock file {}", lock_path.display()))
}

fn write_owner(mut file: File, lock_path: &Path) -> Result<InstanceLock> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())?;
    match config::get_custom_config_dir() {
        Some(dir) => writeln!(file, "{}", dir.display())?,
        None => writeln!(file)?,
    }
    file.flush()?;

    Ok(InstanceLock {
        file,
        path: lock_path.to_path_buf(),
    })
}

/// PID recorded in the lock file, if it can be read.
pub fn read_owner_pid(lock_path: &Path) -> Option<u32> {
    let content = std::fs::read_to_string(lock_path).ok()?;
    content.lines().next()?.trim().parse().ok()
}

fn is_process_running(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

/// PID of the live clock holding the lock at `lock_path`, if any.
pub fn running_instance_pid(lock_path: &Path) -> Option<u32> {
    read_owner_pid(lock_path).filter(|pid| is_process_running(*pid))
}

/// Ask the running clock to re-read its settings (SIGUSR2).
pub fn send_reload_signal(pid: u32) -> Result<()> {
    let pid = i32::try_from(pid).with_context(|| format!("Invalid PID {pid}"))?;
    kill(Pid::from_raw(pid), Signal::SIGUSR2)
        .map_err(|e| anyhow::anyhow!("Failed to send reload signal: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lock_records_pid_and_is_removed_on_drop() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nightclock.lock");

        let lock = acquire_lock(&path).unwrap().unwrap();
        assert_eq!(lock.path(), path.as_path());
        assert_eq!(read_owner_pid(&path), Some(std::process::id()));

        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn test_second_acquire_sees_running_owner() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nightclock.lock");

        let _lock = acquire_lock(&path).unwrap().unwrap();
        assert!(acquire_lock(&path).unwrap().is_none());
    }

    #[test]
    fn test_running_instance_requires_live_owner() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nightclock.lock");
        assert_eq!(running_instance_pid(&path), None);

        let _lock = acquire_lock(&path).unwrap().unwrap();
        assert_eq!(running_instance_pid(&path), Some(std::process::id()));

        // PIDs above the kernel limit never belong to a live process
        std::fs::write(temp_dir.path().join("dead.lock"), "99999999\n").unwrap();
        assert_eq!(running_instance_pid(&temp_dir.path().join("dead.lock")), None);
    }

    #[test]
    fn test_reload_signal_to_missing_process_fails() {
        assert!(send_reload_signal(99_999_999).is_err());
        assert!(send_reload_signal(u32::MAX).is_err());
    }

    #[test]
    fn test_unlocked_leftover_file_is_reused() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nightclock.lock");
        std::fs::write(&path, "not-a-pid\n").unwrap();

        let lock = acquire_lock(&path).unwrap();
        assert!(lock.is_some());
        assert_eq!(read_owner_pid(&path), Some(std::process::id()));
    }
}
