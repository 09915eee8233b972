//! Remote source fetched on every call.
//!
//! No caching and no request coalescing: concurrent discovery polls for the
//! same source each perform their own GET.

use std::io::Cursor;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::{HttpOptions, SourceConfig, SourceKind};
use crate::observability::metrics;
use crate::source::{parse_targets, SourceError, Target, TargetSource};

/// A discovery source backed by an http/https URL.
pub struct HttpSource {
    config: SourceConfig,
    options: HttpOptions,
    client: Client,
}

impl HttpSource {
    /// Build the client from the transport options in `config.kind`.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let options = match &config.kind {
            SourceKind::Http(options) => options.clone(),
            SourceKind::File(_) => HttpOptions::default(),
        };
        let client = Client::builder()
            .danger_accept_invalid_certs(options.insecure)
            .build()?;
        Ok(Self {
            config,
            options,
            client,
        })
    }

    async fn fetch(&self) -> Result<Vec<Target>, SourceError> {
        let mut request = self.client.get(self.config.locator.clone());
        if let Some(auth) = &self.options.basic_auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.config.locator.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        parse_targets(Cursor::new(body), &self.config)
    }
}

#[async_trait]
impl TargetSource for HttpSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn targets(&self) -> Result<Vec<Target>, SourceError> {
        let result = self.fetch().await;
        match &result {
            Ok(targets) => {
                metrics::record_source_read(&self.config.name, "ok");
                metrics::record_target_count(&self.config.name, targets.len());
            }
            Err(e) => {
                metrics::record_source_read(&self.config.name, e.kind());
                tracing::error!(
                    source = %self.config.name,
                    url = %self.config.locator,
                    error = %e,
                    "Failed to fetch discovery source"
                );
            }
        }
        result
    }
}
