//! Timestamped copies of the story library with bounded retention.

use crate::permissions::with_owner_write;
use crate::CoreError;
use chrono::{DateTime, Datelike, Local, Timelike};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::task;
use tracing::{debug, info};

pub const DEFAULT_MAX_BACKUPS: usize = 10;

/// How many backups survive a backup run. Zero keeps none, not even the
/// copy just made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    max_backups: usize,
}

impl RetentionPolicy {
    pub fn new(max_backups: usize) -> Self {
        Self { max_backups }
    }

    pub fn max_backups(&self) -> usize {
        self.max_backups
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BACKUPS)
    }
}

/// `year-month-day hour-minute-second-millisecond`, no zero padding, 24-hour clock.
pub fn backup_name<T: Datelike + Timelike>(at: &T) -> String {
    // leap seconds report nanos past one second
    let millis = (at.nanosecond() / 1_000_000).min(999);
    format!(
        "{}-{}-{} {}-{}-{}-{}",
        at.year(),
        at.month(),
        at.day(),
        at.hour(),
        at.minute(),
        at.second(),
        millis
    )
}

#[derive(Debug, Clone)]
pub struct BackupEntry {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

#[derive(Debug, Clone)]
pub struct BackupReport {
    pub created: PathBuf,
    pub files_copied: u64,
    pub pruned: Vec<PathBuf>,
    pub remaining: usize,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BackupManager;

impl BackupManager {
    pub fn new() -> Self {
        Self
    }

    pub async fn backup(
        &self,
        source: &Path,
        backups_root: &Path,
        policy: RetentionPolicy,
    ) -> Result<BackupReport, CoreError> {
        self.backup_at(source, backups_root, policy, Local::now()).await
    }

    /// Copies `source` to `backups_root/<name for at>`, then prunes the oldest
    /// backups past the policy. Nothing is pruned if the copy fails.
    pub async fn backup_at(
        &self,
        source: &Path,
        backups_root: &Path,
        policy: RetentionPolicy,
        at: DateTime<Local>,
    ) -> Result<BackupReport, CoreError> {
        info!(source = %source.display(), "backing up story library");

        let src = source.to_path_buf();
        let root = backups_root.to_path_buf();
        let dest = root.join(backup_name(&at));

        task::spawn_blocking(move || {
            let files_copied = copy_tree(&src, &dest)?;
            debug!(dest = %dest.display(), files_copied, "story library copied");

            let backups = list_backups(&root)?;
            let total = backups.len();
            let pruned = if total > policy.max_backups() {
                info!(
                    count = total,
                    keep = policy.max_backups(),
                    "there are {total} story library backups, pruning"
                );
                prune(&backups[..total - policy.max_backups()])?
            } else {
                Vec::new()
            };

            Ok(BackupReport {
                created: dest,
                files_copied,
                remaining: total - pruned.len(),
                pruned,
            })
        })
        .await?
    }

    pub async fn list(&self, backups_root: &Path) -> Result<Vec<BackupEntry>, CoreError> {
        let root = backups_root.to_path_buf();
        task::spawn_blocking(move || list_backups(&root)).await?
    }
}

/// Non-hidden directories directly under `root`, oldest modification first.
pub fn list_backups(root: &Path) -> Result<Vec<BackupEntry>, CoreError> {
    let mut backups = Vec::new();
    for entry in fs::read_dir(root).map_err(|e| CoreError::io(root, e))? {
        let entry = entry.map_err(|e| CoreError::io(root, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        let meta = fs::metadata(&path).map_err(|e| CoreError::io(&path, e))?;
        if !meta.is_dir() {
            continue;
        }
        let modified = meta.modified().map_err(|e| CoreError::io(&path, e))?;
        backups.push(BackupEntry { name, path, modified });
    }
    backups.sort_by_key(|b| b.modified);
    Ok(backups)
}

/// Recursive copy; returns the number of files and links written. Symlinks
/// are recreated as links, never followed. Copied files are left
/// owner-writable so pruning can remove them later.
fn copy_tree(src: &Path, dst: &Path) -> Result<u64, CoreError> {
    let meta = fs::metadata(src).map_err(|e| CoreError::io(src, e))?;
    if !meta.is_dir() {
        return Err(CoreError::Io {
            path: src.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, "not a directory"),
        });
    }
    fs::create_dir_all(dst).map_err(|e| CoreError::io(dst, e))?;

    let mut copied = 0;
    for entry in fs::read_dir(src).map_err(|e| CoreError::io(src, e))? {
        let entry = entry.map_err(|e| CoreError::io(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let kind = entry.file_type().map_err(|e| CoreError::io(&from, e))?;
        if kind.is_symlink() {
            copy_link(&from, &to)?;
            copied += 1;
        } else if kind.is_dir() {
            copied += copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| CoreError::io(&from, e))?;
            let perms = fs::metadata(&to)
                .map_err(|e| CoreError::io(&to, e))?
                .permissions();
            fs::set_permissions(&to, with_owner_write(perms, true))
                .map_err(|e| CoreError::io(&to, e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(unix)]
fn copy_link(from: &Path, to: &Path) -> Result<(), CoreError> {
    let target = fs::read_link(from).map_err(|e| CoreError::io(from, e))?;
    std::os::unix::fs::symlink(&target, to).map_err(|e| CoreError::io(to, e))
}

#[cfg(windows)]
fn copy_link(from: &Path, to: &Path) -> Result<(), CoreError> {
    use std::os::windows::fs::{symlink_dir, symlink_file};
    let target = fs::read_link(from).map_err(|e| CoreError::io(from, e))?;
    // dangling links are recreated as file links
    let points_at_dir = fs::metadata(from).map(|m| m.is_dir()).unwrap_or(false);
    let made = if points_at_dir {
        symlink_dir(&target, to)
    } else {
        symlink_file(&target, to)
    };
    made.map_err(|e| CoreError::io(to, e))
}

#[cfg(not(any(unix, windows)))]
fn copy_link(from: &Path, _to: &Path) -> Result<(), CoreError> {
    Err(CoreError::Io {
        path: from.to_path_buf(),
        source: io::Error::new(io::ErrorKind::Unsupported, "symlinks are not supported"),
    })
}

/// Removes every entry; the first failure is reported after all were tried.
fn prune(doomed: &[BackupEntry]) -> Result<Vec<PathBuf>, CoreError> {
    let mut removed = Vec::with_capacity(doomed.len());
    let mut first_err = None;
    for b in doomed {
        match fs::remove_dir_all(&b.path) {
            Ok(()) => {
                debug!(path = %b.path.display(), "pruned backup");
                removed.push(b.path.clone());
            }
            Err(e) => {
                if first_err.is_none() {
                    first_err = Some(CoreError::io(&b.path, e));
                }
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(removed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn names_have_no_padding() {
        let t = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_milli_opt(7, 4, 9, 8)
            .unwrap();
        assert_eq!(backup_name(&t), "2024-3-5 7-4-9-8");

        let t = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_milli_opt(23, 59, 58, 999)
            .unwrap();
        assert_eq!(backup_name(&t), "2023-12-31 23-59-58-999");
    }

    #[test]
    fn names_from_local_time() {
        let t = Local.with_ymd_and_hms(2020, 1, 2, 13, 0, 0).unwrap();
        assert_eq!(backup_name(&t), "2020-1-2 13-0-0-0");
    }

    #[test]
    fn retention_keeps_the_requested_count() {
        assert_eq!(RetentionPolicy::new(0).max_backups(), 0);
        assert_eq!(RetentionPolicy::new(3).max_backups(), 3);
        assert_eq!(RetentionPolicy::default().max_backups(), DEFAULT_MAX_BACKUPS);
    }
}
