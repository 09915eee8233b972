//! Validated, immutable description of one discovery source.

use std::path::PathBuf;
use url::Url;

use crate::config::schema::{BasicAuth, LabelColumn};

/// Reader kind selected by the locator scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Local file, watched for changes.
    File(PathBuf),
    /// Remote resource fetched on every request.
    Http(HttpOptions),
}

/// Transport options for http/https sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    pub insecure: bool,
    pub basic_auth: Option<BasicAuth>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            insecure: true,
            basic_auth: None,
        }
    }
}

/// Which columns become the target address and labels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnMapping {
    pub target_col: usize,
    pub labels: Vec<LabelColumn>,
}

/// How raw text is turned into rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub delimiter: u8,
    pub comment_prefix: String,
    pub strict_columns: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            comment_prefix: String::new(),
            strict_columns: false,
        }
    }
}

/// A discovery source ready to be handed to a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub locator: Url,
    pub kind: SourceKind,
    pub mapping: ColumnMapping,
    pub parse: ParseOptions,
}
