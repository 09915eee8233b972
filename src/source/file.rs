//! Local file source with change notification.
//!
//! # States
//! ```text
//! Idle ──new()──▶ Watching ──write event──▶ Reading ──ok──▶ Updated ──▶ Watching
//!                    │                         │
//!                    │                         └─err─▶ logged, cache kept, Watching
//!                    └─shutdown / channel closed──▶ Stopped
//! ```
//!
//! The parent directory is watched rather than the file itself so editors
//! that replace the file through a rename are still picked up.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc, RwLock};

use crate::config::SourceConfig;
use crate::observability::metrics;
use crate::source::{parse_targets, SourceError, Target, TargetSource};

/// A discovery source backed by a local CSV file.
pub struct FileSource {
    shared: Arc<Shared>,
    watching: bool,
}

struct Shared {
    config: SourceConfig,
    path: PathBuf,
    /// `None` until the first successful read.
    cache: RwLock<Option<Vec<Target>>>,
}

impl FileSource {
    /// Create the source and start watching `path`.
    ///
    /// Watch registration failures are logged and leave the source readable
    /// but never refreshed.
    pub fn new(config: SourceConfig, path: PathBuf, shutdown: broadcast::Receiver<()>) -> Self {
        let shared = Arc::new(Shared {
            config,
            path,
            cache: RwLock::new(None),
        });

        let watching = match register_watcher(&shared.path) {
            Ok((watcher, events)) => {
                tracing::info!(
                    source = %shared.config.name,
                    path = ?shared.path,
                    "Watching discovery file"
                );
                tokio::spawn(watch_loop(shared.clone(), watcher, events, shutdown));
                true
            }
            Err(e) => {
                tracing::error!(
                    source = %shared.config.name,
                    path = ?shared.path,
                    error = %e,
                    "Failed to watch discovery file, targets will not refresh until restart"
                );
                false
            }
        };

        Self { shared, watching }
    }

    /// Whether change notifications were registered successfully.
    pub fn is_watching(&self) -> bool {
        self.watching
    }
}

#[async_trait]
impl TargetSource for FileSource {
    fn name(&self) -> &str {
        &self.shared.config.name
    }

    async fn targets(&self) -> Result<Vec<Target>, SourceError> {
        if let Some(targets) = self.shared.cache.read().await.as_ref() {
            return Ok(targets.clone());
        }

        let mut cache = self.shared.cache.write().await;
        // Another caller may have populated the cache while we waited.
        if let Some(targets) = cache.as_ref() {
            return Ok(targets.clone());
        }

        let targets = self.shared.load().await?;
        *cache = Some(targets.clone());
        Ok(targets)
    }
}

impl Shared {
    /// Read and parse the file on the blocking pool.
    async fn load(self: &Arc<Self>) -> Result<Vec<Target>, SourceError> {
        let this = self.clone();
        let result = tokio::task::spawn_blocking(move || this.read_file())
            .await
            .map_err(SourceError::from)
            .and_then(|r| r);

        match &result {
            Ok(targets) => {
                metrics::record_source_read(&self.config.name, "ok");
                metrics::record_target_count(&self.config.name, targets.len());
            }
            Err(e) => {
                metrics::record_source_read(&self.config.name, e.kind());
                tracing::error!(
                    source = %self.config.name,
                    path = ?self.path,
                    error = %e,
                    "Failed to read discovery file"
                );
            }
        }
        result
    }

    fn read_file(&self) -> Result<Vec<Target>, SourceError> {
        let file = File::open(&self.path).map_err(|source| SourceError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_targets(file, &self.config)
    }

    /// Re-read after a change and replace the cache.
    async fn reload(self: &Arc<Self>) -> Result<usize, SourceError> {
        let targets = self.load().await?;
        let count = targets.len();
        *self.cache.write().await = Some(targets);
        Ok(count)
    }

    fn is_relevant(&self, event: &Event) -> bool {
        if !(event.kind.is_modify() || event.kind.is_create()) {
            return false;
        }
        let file_name = self.path.file_name();
        event.paths.iter().any(|p| p.file_name() == file_name)
    }
}

type EventQueue = mpsc::UnboundedReceiver<notify::Result<Event>>;

fn register_watcher(path: &Path) -> notify::Result<(RecommendedWatcher, EventQueue)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        },
        Config::default(),
    )?;
    watcher.watch(&watch_root(path), RecursiveMode::NonRecursive)?;
    Ok((watcher, rx))
}

/// Directory holding `path`, or `.` for a bare file name.
fn watch_root(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

async fn watch_loop(
    shared: Arc<Shared>,
    watcher: RecommendedWatcher,
    mut events: EventQueue,
    mut shutdown: broadcast::Receiver<()>,
) {
    let name = shared.config.name.clone();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(Ok(event)) => {
                    if !shared.is_relevant(&event) {
                        continue;
                    }
                    tracing::info!(source = %name, kind = ?event.kind, "Modified file");
                    // Errors are logged in load(); the stale cache stays in place.
                    if let Ok(count) = shared.reload().await {
                        tracing::debug!(source = %name, targets = count, "Targets refreshed");
                    }
                }
                Some(Err(e)) => {
                    tracing::error!(source = %name, error = %e, "Watch error");
                }
                None => break,
            },
            _ = shutdown.recv() => {
                tracing::debug!(source = %name, "Watcher received shutdown signal");
                break;
            }
        }
    }
    drop(watcher);
    tracing::debug!(source = %name, "File watcher loop ended");
}
