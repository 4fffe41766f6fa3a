use crate::backup::{BackupEntry, BackupManager, BackupReport, RetentionPolicy};
use crate::locale::{DefaultLocale, Localizer};
use crate::locker::DirectoryLocker;
use crate::paths::{ProfileDirs, StoryPaths, SystemProfile};
use crate::shell::{Revealer, SystemRevealer};
use crate::CoreError;
use std::path::PathBuf;
use std::sync::Arc;

/// The user's story library folder and everything done to it.
///
/// Paths are resolved on every call. Calls are not serialized against each
/// other; a caller racing `lock` with `backup` gets whatever the filesystem
/// does.
#[derive(Clone)]
pub struct StoryDirectory {
    paths: StoryPaths,
    locker: DirectoryLocker,
    backups: BackupManager,
    revealer: Arc<dyn Revealer>,
}

impl Default for StoryDirectory {
    fn default() -> Self {
        Self::new(
            StoryPaths::new(Arc::new(SystemProfile), Arc::new(DefaultLocale)),
            DirectoryLocker::default(),
            Arc::new(SystemRevealer),
        )
    }
}

impl StoryDirectory {
    pub fn new(paths: StoryPaths, locker: DirectoryLocker, revealer: Arc<dyn Revealer>) -> Self {
        Self {
            paths,
            locker,
            backups: BackupManager::new(),
            revealer,
        }
    }

    /// Host-default locker and revealer over the given profile and locale.
    pub fn with_profile(profile: Arc<dyn ProfileDirs>, locale: Arc<dyn Localizer>) -> Self {
        Self::new(
            StoryPaths::new(profile, locale),
            DirectoryLocker::default(),
            Arc::new(SystemRevealer),
        )
    }

    pub fn paths(&self) -> &StoryPaths {
        &self.paths
    }

    pub fn path(&self) -> Result<PathBuf, CoreError> {
        self.paths.story_dir()
    }

    pub fn backups_path(&self) -> Result<PathBuf, CoreError> {
        self.paths.backups_dir()
    }

    /// Creates the directory and any missing parents; fine if it already exists.
    pub async fn create(&self) -> Result<(), CoreError> {
        let dir = self.path()?;
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| CoreError::io(&dir, e))
    }

    pub async fn lock(&self) -> Result<(), CoreError> {
        let dir = self.path()?;
        self.locker.lock(&dir).await?;
        tracing::info!(path = %dir.display(), "story library locked");
        Ok(())
    }

    pub async fn unlock(&self) -> Result<(), CoreError> {
        let dir = self.path()?;
        self.locker.unlock(&dir).await?;
        tracing::info!(path = %dir.display(), "story library unlocked");
        Ok(())
    }

    pub async fn is_locked(&self) -> Result<bool, CoreError> {
        self.locker.is_locked(&self.path()?).await
    }

    /// Best effort; problems are logged and never returned.
    pub fn reveal(&self) {
        match self.path() {
            Ok(dir) => self.revealer.reveal(&dir),
            Err(e) => tracing::warn!(error = %e, "cannot reveal story library"),
        }
    }

    pub async fn backup(&self, policy: RetentionPolicy) -> Result<BackupReport, CoreError> {
        let source = self.path()?;
        let root = self.backups_path()?;
        self.backups.backup(&source, &root, policy).await
    }

    /// Existing backups, oldest first. Empty when no backup was ever made.
    pub async fn list_backups(&self) -> Result<Vec<BackupEntry>, CoreError> {
        match self.backups.list(&self.backups_path()?).await {
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            other => other,
        }
    }
}
