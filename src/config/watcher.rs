//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself: editors that
//! save by renaming a temp file over the config replace its inode, and a
//! watch on the old inode would go quiet after the first save. Events are
//! filtered by file name and a burst of them triggers a single reload.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// Quiet period after the last event before the file is re-read.
const DEBOUNCE: Duration = Duration::from_millis(200);

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in the background.
    ///
    /// The returned watcher must be kept alive for as long as updates are
    /// wanted; dropping it also ends the reload thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let file_name = self.path.file_name().map(OsString::from);
        let (event_tx, event_rx) = std_mpsc::channel::<()>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches(&event, file_name.as_deref()) => {
                    let _ = event_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(watch_dir(&self.path), RecursiveMode::NonRecursive)?;

        let path = self.path.clone();
        let updates = self.update_tx;
        thread::Builder::new()
            .name("config-reload".into())
            .spawn(move || reload_loop(&path, &event_rx, &updates))
            .map_err(notify::Error::io)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

fn watch_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

fn touches(event: &Event, file_name: Option<&OsStr>) -> bool {
    let Some(file_name) = file_name else {
        return false;
    };
    (event.kind.is_modify() || event.kind.is_create())
        && event.paths.iter().any(|p| p.file_name() == Some(file_name))
}

fn reload_loop(
    path: &Path,
    events: &std_mpsc::Receiver<()>,
    updates: &mpsc::UnboundedSender<GatewayConfig>,
) {
    while events.recv().is_ok() {
        while events.recv_timeout(DEBOUNCE).is_ok() {}

        tracing::info!(path = ?path, "Config file change detected, reloading");
        match load_config(path) {
            Ok(config) => {
                if updates.send(config).is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("recipe-gateway-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn backend_toml(base_url: &str) -> String {
        format!("[backend]\nbase_url = \"{base_url}\"\n")
    }

    async fn wait_for_backend(rx: &mut mpsc::UnboundedReceiver<GatewayConfig>, want: &str) {
        tokio::time::timeout(Duration::from_secs(10), async {
            while let Some(config) = rx.recv().await {
                if config.backend.base_url == want {
                    return;
                }
            }
            panic!("watcher channel closed");
        })
        .await
        .unwrap_or_else(|_| panic!("no reload with base_url {want}"));
    }

    #[tokio::test]
    async fn keeps_reloading_after_rename_over_save() {
        let dir = scratch_dir();
        let path = dir.join("gateway.toml");
        fs::write(&path, backend_toml("http://a:1")).unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _watcher = watcher.run().unwrap();

        let temp = dir.join(".gateway.toml.swp");
        fs::write(&temp, backend_toml("http://b:1")).unwrap();
        fs::rename(&temp, &path).unwrap();
        wait_for_backend(&mut rx, "http://b:1").await;

        fs::write(&path, backend_toml("http://c:1")).unwrap();
        wait_for_backend(&mut rx, "http://c:1").await;

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn ignores_siblings_in_the_directory() {
        let dir = scratch_dir();
        let path = dir.join("gateway.toml");
        fs::write(&path, backend_toml("http://a:1")).unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _watcher = watcher.run().unwrap();

        fs::write(dir.join("other.toml"), backend_toml("http://x:1")).unwrap();
        let quiet = tokio::time::timeout(Duration::from_millis(800), rx.recv()).await;
        assert!(quiet.is_err(), "sibling change triggered a reload");

        let _ = fs::remove_dir_all(&dir);
    }
}
