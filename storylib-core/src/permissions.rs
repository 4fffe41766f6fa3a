//! Owner-write permission switching.
//!
//! Two strategies exist. On POSIX hosts clearing the owner-write bit on the
//! directory itself is enough to stop edits inside it. Windows ignores
//! directory bits for contained files, so every immediate entry gets an
//! absolute mode instead (0o666 writable, 0o444 read-only). The host's
//! strategy is chosen once, in [`platform_toggle`].

use crate::CoreError;
use async_trait::async_trait;
use std::fs::Permissions;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;

pub const OWNER_WRITE: u32 = 0o200;
pub const ALL_READ_WRITE: u32 = 0o666;
pub const ALL_READ_ONLY: u32 = 0o444;

#[async_trait]
pub trait PermissionToggle: Send + Sync {
    async fn set_writable(&self, target: &Path, writable: bool) -> Result<(), CoreError>;

    /// Whether the owner can currently write to what `set_writable` covers.
    async fn is_writable(&self, target: &Path) -> Result<bool, CoreError>;
}

/// The strategy for the host this binary was built for.
pub fn platform_toggle() -> Arc<dyn PermissionToggle> {
    if cfg!(windows) {
        Arc::new(PerFileMode)
    } else {
        Arc::new(OwnerWriteBit)
    }
}

/// Flips only the owner-write bit of the target itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct OwnerWriteBit;

#[async_trait]
impl PermissionToggle for OwnerWriteBit {
    async fn set_writable(&self, target: &Path, writable: bool) -> Result<(), CoreError> {
        let meta = tokio::fs::metadata(target)
            .await
            .map_err(|e| CoreError::io(target, e))?;
        let perms = with_owner_write(meta.permissions(), writable);
        tokio::fs::set_permissions(target, perms)
            .await
            .map_err(|e| CoreError::io(target, e))?;
        tracing::debug!(path = %target.display(), writable, "owner-write bit updated");
        Ok(())
    }

    async fn is_writable(&self, target: &Path) -> Result<bool, CoreError> {
        let meta = tokio::fs::metadata(target)
            .await
            .map_err(|e| CoreError::io(target, e))?;
        Ok(owner_can_write(&meta.permissions()))
    }
}

/// Sets an absolute mode on every immediate entry of the target, concurrently.
/// Entries already changed stay changed if another one fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerFileMode;

#[async_trait]
impl PermissionToggle for PerFileMode {
    async fn set_writable(&self, target: &Path, writable: bool) -> Result<(), CoreError> {
        let mode = if writable { ALL_READ_WRITE } else { ALL_READ_ONLY };
        let mut entries = tokio::fs::read_dir(target)
            .await
            .map_err(|e| CoreError::io(target, e))?;

        let mut tasks = JoinSet::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoreError::io(target, e))?
        {
            let path = entry.path();
            tasks.spawn(async move {
                apply_mode(&path, mode)
                    .await
                    .map_err(|e| CoreError::io(&path, e))
            });
        }

        let mut changed = 0usize;
        let mut first_err = None;
        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(CoreError::from).and_then(|r| r) {
                Ok(()) => changed += 1,
                Err(e) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }

        match first_err {
            Some(e) => {
                tracing::warn!(
                    path = %target.display(),
                    changed,
                    error = %e,
                    "per-file mode change failed"
                );
                Err(e)
            }
            None => {
                tracing::debug!(
                    path = %target.display(),
                    mode = %format!("{mode:o}"),
                    changed,
                    "per-file modes set"
                );
                Ok(())
            }
        }
    }

    async fn is_writable(&self, target: &Path) -> Result<bool, CoreError> {
        let mut entries = tokio::fs::read_dir(target)
            .await
            .map_err(|e| CoreError::io(target, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoreError::io(target, e))?
        {
            let path = entry.path();
            let meta = tokio::fs::metadata(&path)
                .await
                .map_err(|e| CoreError::io(&path, e))?;
            if !owner_can_write(&meta.permissions()) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(unix)]
pub(crate) fn with_owner_write(mut perms: Permissions, writable: bool) -> Permissions {
    use std::os::unix::fs::PermissionsExt;
    let mode = perms.mode() & 0o7777;
    perms.set_mode(if writable { mode | OWNER_WRITE } else { mode & !OWNER_WRITE });
    perms
}

#[cfg(not(unix))]
pub(crate) fn with_owner_write(mut perms: Permissions, writable: bool) -> Permissions {
    perms.set_readonly(!writable);
    perms
}

#[cfg(unix)]
fn owner_can_write(perms: &Permissions) -> bool {
    use std::os::unix::fs::PermissionsExt;
    perms.mode() & OWNER_WRITE != 0
}

#[cfg(not(unix))]
fn owner_can_write(perms: &Permissions) -> bool {
    !perms.readonly()
}

#[cfg(unix)]
async fn apply_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, Permissions::from_mode(mode)).await
}

// Only the read-only attribute exists here; any write bit means writable.
#[cfg(not(unix))]
async fn apply_mode(path: &Path, mode: u32) -> io::Result<()> {
    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_readonly(mode & 0o222 == 0);
    tokio::fs::set_permissions(path, perms).await
}
