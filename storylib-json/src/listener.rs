use crate::JsonFile;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A request to persist `data` as `filename`. Nobody is told whether it worked.
#[derive(Debug, Clone)]
pub struct SaveJson {
    pub filename: String,
    pub data: serde_json::Value,
}

impl SaveJson {
    pub fn new(filename: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }
}

pub fn save_channel() -> (mpsc::UnboundedSender<SaveJson>, mpsc::UnboundedReceiver<SaveJson>) {
    mpsc::unbounded_channel()
}

/// Saves every request in arrival order until all senders are dropped.
/// Failures are logged and do not stop the loop.
pub fn spawn_save_listener(
    store: JsonFile,
    mut requests: mpsc::UnboundedReceiver<SaveJson>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(req) = requests.recv().await {
            if let Err(e) = store.save(&req.filename, &req.data).await {
                tracing::warn!(filename = %req.filename, error = %e, "save-json failed");
            }
        }
        tracing::debug!("save-json listener stopped");
    })
}
