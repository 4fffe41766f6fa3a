use crate::permissions::{platform_toggle, PermissionToggle};
use crate::CoreError;
use std::path::Path;
use std::sync::Arc;

/// Lock/unlock over a directory using a [`PermissionToggle`]. Errors from the
/// toggle pass through unchanged.
#[derive(Clone)]
pub struct DirectoryLocker {
    toggle: Arc<dyn PermissionToggle>,
}

impl Default for DirectoryLocker {
    fn default() -> Self {
        Self::new(platform_toggle())
    }
}

impl DirectoryLocker {
    pub fn new(toggle: Arc<dyn PermissionToggle>) -> Self {
        Self { toggle }
    }

    pub async fn lock(&self, dir: &Path) -> Result<(), CoreError> {
        self.toggle.set_writable(dir, false).await
    }

    pub async fn unlock(&self, dir: &Path) -> Result<(), CoreError> {
        self.toggle.set_writable(dir, true).await
    }

    pub async fn is_locked(&self, dir: &Path) -> Result<bool, CoreError> {
        Ok(!self.toggle.is_writable(dir).await?)
    }
}
