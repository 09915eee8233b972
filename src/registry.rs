//! Discovery registry: discovery name → reader.
//!
//! Built once at startup and shared with the HTTP layer through `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{SourceConfig, SourceKind};
use crate::lifecycle::Shutdown;
use crate::source::{FileSource, HttpSource, SourceError, TargetSource};

#[derive(Default)]
pub struct DiscoveryRegistry {
    sources: BTreeMap<String, Arc<dyn TargetSource>>,
}

impl DiscoveryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create one reader per source. File watchers subscribe to `shutdown`.
    pub fn from_config(configs: Vec<SourceConfig>, shutdown: &Shutdown) -> Result<Self, SourceError> {
        let mut registry = Self::new();
        for config in configs {
            let source: Arc<dyn TargetSource> = match config.kind.clone() {
                SourceKind::File(path) => Arc::new(FileSource::new(config, path, shutdown.subscribe())),
                SourceKind::Http(_) => Arc::new(HttpSource::new(config)?),
            };
            tracing::info!(source = %source.name(), "Discovery source registered");
            registry.insert(source);
        }
        Ok(registry)
    }

    /// Register a reader under its own name, replacing any previous one.
    pub fn insert(&mut self, source: Arc<dyn TargetSource>) {
        self.sources.insert(source.name().to_string(), source);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TargetSource>> {
        self.sources.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpOptions;
    use crate::source::tests::sample_config;
    use url::Url;

    #[tokio::test]
    async fn test_from_config_builds_both_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.csv");
        std::fs::write(&path, "h1,prod\n").unwrap();

        let mut file = sample_config();
        file.kind = SourceKind::File(path);

        let mut remote = sample_config();
        remote.name = "remote".into();
        remote.locator = Url::parse("http://127.0.0.1:1/t.csv").unwrap();
        remote.kind = SourceKind::Http(HttpOptions::default());

        let shutdown = Shutdown::new();
        let registry = DiscoveryRegistry::from_config(vec![file, remote], &shutdown).unwrap();
        assert!(DiscoveryRegistry::new().is_empty());
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["nodes", "remote"]);
        assert!(registry.get("unknown").is_none());

        let nodes = registry.get("nodes").unwrap();
        assert_eq!(nodes.targets().await.unwrap()[0].targets, vec!["h1"]);
        assert_eq!(shutdown.receiver_count(), 1);
    }
}
