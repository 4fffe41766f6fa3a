use std::fs;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use storylib_core::FixedProfile;
use storylib_json::{save_channel, spawn_save_listener, JsonError, JsonFile, SaveJson};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Prefs {
    theme: String,
    recent: Vec<String>,
}

fn store(root: &std::path::Path) -> JsonFile {
    JsonFile::new(Arc::new(FixedProfile::new(root.join("docs"), root.join("appdata"))))
}

#[tokio::test]
async fn save_creates_folder_and_load_reads_back() {
    let tmp = tempfile::tempdir().unwrap();
    let files = store(tmp.path());
    let prefs = Prefs {
        theme: "dark".into(),
        recent: vec!["My Story".into()],
    };

    files.save("prefs.json", &prefs).await.unwrap();
    assert!(tmp.path().join("appdata").join("prefs.json").is_file());

    let back: Prefs = files.load("prefs.json").await.unwrap();
    assert_eq!(back, prefs);
}

#[tokio::test]
async fn save_replaces_the_whole_file() {
    let tmp = tempfile::tempdir().unwrap();
    let files = store(tmp.path());

    files.save("state.json", &json!({"a": [1, 2, 3], "b": "long value"})).await.unwrap();
    files.save("state.json", &json!({"c": 1})).await.unwrap();

    let raw = fs::read_to_string(files.path_for("state.json").unwrap()).unwrap();
    assert_eq!(raw, r#"{"c":1}"#);
}

#[tokio::test]
async fn load_missing_file_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let err = store(tmp.path())
        .load::<serde_json::Value>("nothing.json")
        .await
        .unwrap_err();
    assert!(matches!(err, JsonError::Core(ref e) if e.is_not_found()));
}

#[tokio::test]
async fn load_garbage_is_a_parse_error() {
    let tmp = tempfile::tempdir().unwrap();
    let files = store(tmp.path());
    let path = files.path_for("broken.json").unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{not json").unwrap();

    let err = files.load::<serde_json::Value>("broken.json").await.unwrap_err();
    assert!(matches!(err, JsonError::Parse { path: ref p, .. } if p == &path));
}

#[tokio::test]
async fn listener_saves_requests_and_survives_failures() {
    let tmp = tempfile::tempdir().unwrap();
    let files = store(tmp.path());
    // a directory where a file should go makes that one save fail
    fs::create_dir_all(files.path_for("blocked.json").unwrap()).unwrap();

    let (tx, rx) = save_channel();
    let handle = spawn_save_listener(files.clone(), rx);

    tx.send(SaveJson::new("blocked.json", json!({"x": 1}))).unwrap();
    tx.send(SaveJson::new("story-formats.json", json!(["Harlowe", "SugarCube"]))).unwrap();
    tx.send(SaveJson::new("story-formats.json", json!(["Snowman"]))).unwrap();
    drop(tx);
    handle.await.unwrap();

    let formats: Vec<String> = files.load("story-formats.json").await.unwrap();
    assert_eq!(formats, vec!["Snowman"]);
    assert!(files.path_for("blocked.json").unwrap().is_dir());
}
