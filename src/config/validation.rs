//! Configuration validation.
//!
//! Serde handles the syntax; this module checks the semantics of every
//! source entry and builds the validated [`SourceConfig`] list. All problems
//! are collected and reported together instead of stopping at the first.

use std::collections::HashSet;
use url::Url;

use crate::config::schema::{DiscoveryConfig, SourceEntry};
use crate::config::source::{ColumnMapping, HttpOptions, ParseOptions, SourceConfig, SourceKind};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("source #{index}: name must not be empty")]
    EmptyName { index: usize },

    #[error("source {name:?}: duplicate name")]
    DuplicateName { name: String },

    #[error("source {name:?}: not a valid url {locator:?}: {reason}")]
    InvalidLocator {
        name: String,
        locator: String,
        reason: String,
    },

    #[error("source {name:?}: unsupported scheme {scheme:?}")]
    UnsupportedScheme { name: String, scheme: String },

    #[error("source {name:?}: file url {locator:?} does not name a local path")]
    InvalidFilePath { name: String, locator: String },

    #[error("source {name:?}: delimiter {delimiter:?} must start with an ASCII character")]
    InvalidDelimiter { name: String, delimiter: String },

    #[error("source {name:?}: label for column {col} has an empty name")]
    EmptyLabelName { name: String, col: usize },
}

/// Validate the whole document and return the sources in config order.
pub fn validate_config(config: &DiscoveryConfig) -> Result<Vec<SourceConfig>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut sources = Vec::with_capacity(config.discovery_targets.len());

    for (index, entry) in config.discovery_targets.iter().enumerate() {
        if entry.name.is_empty() {
            errors.push(ValidationError::EmptyName { index });
            continue;
        }
        if !seen.insert(entry.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                name: entry.name.clone(),
            });
            continue;
        }
        match validate_source(entry) {
            Ok(source) => sources.push(source),
            Err(mut errs) => errors.append(&mut errs),
        }
    }

    if errors.is_empty() {
        Ok(sources)
    } else {
        Err(errors)
    }
}

/// Validate one entry.
pub fn validate_source(entry: &SourceEntry) -> Result<SourceConfig, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let name = entry.name.clone();

    let delimiter = match entry.delimiter.chars().next() {
        None => b',',
        Some(c) if c.is_ascii() => c as u8,
        Some(_) => {
            errors.push(ValidationError::InvalidDelimiter {
                name: name.clone(),
                delimiter: entry.delimiter.clone(),
            });
            b','
        }
    };

    for label in &entry.labels {
        if label.label_name.is_empty() {
            errors.push(ValidationError::EmptyLabelName {
                name: name.clone(),
                col: label.col,
            });
        }
    }

    let parsed = match Url::parse(&entry.csv_source) {
        Ok(url) => Some(url),
        Err(e) => {
            errors.push(ValidationError::InvalidLocator {
                name: name.clone(),
                locator: entry.csv_source.clone(),
                reason: e.to_string(),
            });
            None
        }
    };

    let kind = parsed.as_ref().and_then(|url| match url.scheme() {
        "file" => match url.to_file_path() {
            Ok(path) => {
                if entry.http_config.is_some() {
                    tracing::warn!(source = %name, "http_config is ignored for file sources");
                }
                Some(SourceKind::File(path))
            }
            Err(()) => {
                errors.push(ValidationError::InvalidFilePath {
                    name: name.clone(),
                    locator: entry.csv_source.clone(),
                });
                None
            }
        },
        "http" | "https" => {
            let mut options = HttpOptions::default();
            if let Some(settings) = &entry.http_config {
                if let Some(insecure) = settings.insecure {
                    options.insecure = insecure;
                }
                options.basic_auth = settings.basic_auth.clone();
            }
            Some(SourceKind::Http(options))
        }
        other => {
            errors.push(ValidationError::UnsupportedScheme {
                name: name.clone(),
                scheme: other.to_string(),
            });
            None
        }
    });

    match (parsed, kind) {
        (Some(locator), Some(kind)) if errors.is_empty() => Ok(SourceConfig {
            name,
            locator,
            kind,
            mapping: ColumnMapping {
                target_col: entry.target_col,
                labels: entry.labels.clone(),
            },
            parse: ParseOptions {
                delimiter,
                comment_prefix: entry.comment_char.clone(),
                strict_columns: entry.strict_columns,
            },
        }),
        _ => Err(errors),
    }
}
