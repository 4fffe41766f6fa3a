use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use storylib_core::{
    DirectoryLocker, FixedProfile, OwnerWriteBit, RetentionPolicy, Revealer, StoryDirectory,
    StoryPaths, TableLocale,
};

/// Remembers what it was asked to reveal.
#[derive(Default)]
struct RecordingRevealer {
    revealed: Mutex<Vec<PathBuf>>,
}

impl RecordingRevealer {
    fn new() -> Self {
        Self::default()
    }

    fn revealed(&self) -> Vec<PathBuf> {
        self.revealed.lock().clone()
    }
}

impl Revealer for RecordingRevealer {
    fn reveal(&self, path: &Path) {
        self.revealed.lock().push(path.to_path_buf());
    }
}

fn service(docs: &Path, revealer: Arc<RecordingRevealer>) -> StoryDirectory {
    let paths = StoryPaths::new(
        Arc::new(FixedProfile::new(docs, docs.join("appdata"))),
        Arc::new(TableLocale::default()),
    );
    StoryDirectory::new(paths, DirectoryLocker::new(Arc::new(OwnerWriteBit)), revealer)
}

#[tokio::test]
async fn create_is_idempotent_and_builds_parents() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = service(tmp.path(), Arc::new(RecordingRevealer::new()));

    assert_eq!(dir.path().unwrap(), tmp.path().join("Twine").join("Stories"));
    dir.create().await.unwrap();
    fs::write(dir.path().unwrap().join("a.json"), "{}").unwrap();
    dir.create().await.unwrap();
    assert!(dir.path().unwrap().join("a.json").exists());
}

#[tokio::test]
async fn reveal_hands_the_story_path_to_the_shell() {
    let tmp = tempfile::tempdir().unwrap();
    let revealer = Arc::new(RecordingRevealer::new());
    let dir = service(tmp.path(), revealer.clone());

    // the folder need not exist
    dir.reveal();
    assert_eq!(revealer.revealed(), vec![tmp.path().join("Twine").join("Stories")]);
}

#[tokio::test]
async fn lock_before_create_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = service(tmp.path(), Arc::new(RecordingRevealer::new()));
    assert!(dir.lock().await.unwrap_err().is_not_found());
}

#[cfg(unix)]
#[tokio::test]
async fn lock_unlock_and_backup_through_the_facade() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = service(tmp.path(), Arc::new(RecordingRevealer::new()));
    dir.create().await.unwrap();
    fs::write(dir.path().unwrap().join("a.json"), "{}").unwrap();
    fs::write(dir.path().unwrap().join("b.twee"), ":: Start").unwrap();

    assert!(dir.list_backups().await.unwrap().is_empty());

    dir.lock().await.unwrap();
    assert!(dir.is_locked().await.unwrap());

    let report = dir.backup(RetentionPolicy::new(2)).await.unwrap();
    assert!(report.created.starts_with(tmp.path().join("Twine").join("Backups")));
    assert!(report.created.join("a.json").exists());
    assert!(report.created.join("b.twee").exists());

    dir.unlock().await.unwrap();
    assert!(!dir.is_locked().await.unwrap());

    let backups = dir.list_backups().await.unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].path, report.created);
}

#[tokio::test]
async fn localized_segments_move_the_library() {
    let tmp = tempfile::tempdir().unwrap();
    let locale = Arc::new(TableLocale::new(HashMap::from([
        ("Stories".to_string(), "Histoires".to_string()),
        ("Backups".to_string(), "Sauvegardes".to_string()),
    ])));
    let profile = Arc::new(FixedProfile::new(tmp.path(), tmp.path()));
    let paths = StoryPaths::new(profile, locale.clone());
    let dir = StoryDirectory::new(
        paths,
        DirectoryLocker::new(Arc::new(OwnerWriteBit)),
        Arc::new(RecordingRevealer::new()),
    );

    assert_eq!(dir.path().unwrap(), tmp.path().join("Twine").join("Histoires"));
    assert_eq!(dir.backups_path().unwrap(), tmp.path().join("Twine").join("Sauvegardes"));

    locale.set("Twine", "Ficelle");
    assert_eq!(dir.path().unwrap(), tmp.path().join("Ficelle").join("Histoires"));
}
