use crate::locale::{Localizer, BACKUPS, STORIES, TWINE};
use crate::CoreError;
use directories::{ProjectDirs, UserDirs};
use std::path::PathBuf;
use std::sync::Arc;

/// Source of the per-user base directories.
pub trait ProfileDirs: Send + Sync {
    fn documents_dir(&self) -> Result<PathBuf, CoreError>;
    fn app_data_dir(&self) -> Result<PathBuf, CoreError>;
}

/// Asks the OS on every call, so profile changes are seen without a restart.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProfile;

impl ProfileDirs for SystemProfile {
    fn documents_dir(&self) -> Result<PathBuf, CoreError> {
        UserDirs::new()
            .and_then(|u| u.document_dir().map(|p| p.to_path_buf()))
            .ok_or(CoreError::MissingProfileDir("documents"))
    }

    fn app_data_dir(&self) -> Result<PathBuf, CoreError> {
        ProjectDirs::from("", "", "Twine")
            .map(|pd| pd.data_dir().to_path_buf())
            .ok_or(CoreError::MissingProfileDir("application data"))
    }
}

/// Explicit roots; either one may be left to the OS.
#[derive(Debug, Default, Clone)]
pub struct FixedProfile {
    pub documents: Option<PathBuf>,
    pub app_data: Option<PathBuf>,
}

impl FixedProfile {
    pub fn new(documents: impl Into<PathBuf>, app_data: impl Into<PathBuf>) -> Self {
        Self {
            documents: Some(documents.into()),
            app_data: Some(app_data.into()),
        }
    }
}

impl ProfileDirs for FixedProfile {
    fn documents_dir(&self) -> Result<PathBuf, CoreError> {
        match &self.documents {
            Some(p) => Ok(p.clone()),
            None => SystemProfile.documents_dir(),
        }
    }

    fn app_data_dir(&self) -> Result<PathBuf, CoreError> {
        match &self.app_data {
            Some(p) => Ok(p.clone()),
            None => SystemProfile.app_data_dir(),
        }
    }
}

/// Computes the story library locations. Nothing is memoized: each call
/// reflects the current profile and locale.
#[derive(Clone)]
pub struct StoryPaths {
    profile: Arc<dyn ProfileDirs>,
    locale: Arc<dyn Localizer>,
}

impl StoryPaths {
    pub fn new(profile: Arc<dyn ProfileDirs>, locale: Arc<dyn Localizer>) -> Self {
        Self { profile, locale }
    }

    fn twine_root(&self) -> Result<PathBuf, CoreError> {
        Ok(self.profile.documents_dir()?.join(self.locale.say(TWINE)))
    }

    /// `<documents>/<Twine>/<Stories>`
    pub fn story_dir(&self) -> Result<PathBuf, CoreError> {
        Ok(self.twine_root()?.join(self.locale.say(STORIES)))
    }

    /// `<documents>/<Twine>/<Backups>`
    pub fn backups_dir(&self) -> Result<PathBuf, CoreError> {
        Ok(self.twine_root()?.join(self.locale.say(BACKUPS)))
    }

    pub fn app_data_dir(&self) -> Result<PathBuf, CoreError> {
        self.profile.app_data_dir()
    }

    pub fn app_data_file(&self, filename: &str) -> Result<PathBuf, CoreError> {
        Ok(self.profile.app_data_dir()?.join(filename))
    }
}
