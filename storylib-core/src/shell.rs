//! Opening folders in the desktop file browser.

use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

/// Fire-and-forget "show this path". Implementations must not panic or block
/// on the opened program.
pub trait Revealer: Send + Sync {
    fn reveal(&self, path: &Path);
}

/// Launches the platform's file browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRevealer;

impl SystemRevealer {
    fn opener() -> &'static str {
        if cfg!(windows) {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        }
    }
}

impl Revealer for SystemRevealer {
    fn reveal(&self, path: &Path) {
        let opener = Self::opener();
        let spawned = Command::new(opener)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => {
                tracing::debug!(path = %path.display(), opener, "revealed");
                reap(child);
            }
            Err(e) => tracing::warn!(
                path = %path.display(),
                opener,
                error = %e,
                "could not open file browser"
            ),
        }
    }
}

/// Waits for the opener on its own thread so it never lingers as a zombie.
fn reap(mut child: Child) -> thread::JoinHandle<Option<ExitStatus>> {
    thread::spawn(move || child.wait().ok())
}

/// Does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRevealer;

impl Revealer for NullRevealer {
    fn reveal(&self, _path: &Path) {}
}
