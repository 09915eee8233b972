//! Discovery source readers.
//!
//! # Data Flow
//! ```text
//! SourceConfig
//!     → file.rs (local file, watched, cached)  |  http.rs (fetched per call)
//!     → normalize.rs (BOM / UTF-16 handling, comment lines)
//!     → csv::Reader (rows)
//!     → mapper.rs (row → Target)
//!     → Vec<Target>
//! ```
//!
//! # Design Decisions
//! - Both readers sit behind the [`TargetSource`] trait; callers never
//!   inspect the concrete kind
//! - A parse error fails the whole read, partial results are never returned
//! - Short rows are skipped silently, they are not errors

pub mod error;
pub mod file;
pub mod http;
pub mod mapper;
pub mod normalize;

use std::collections::BTreeMap;
use std::io::Read;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SourceConfig;

pub use error::SourceError;
pub use file::FileSource;
pub use http::HttpSource;
pub use mapper::map_row;

/// One entry of the Prometheus HTTP SD response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Always exactly one address.
    pub targets: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// A named origin of discovery targets.
#[async_trait]
pub trait TargetSource: Send + Sync {
    /// Name used in the `discover` query parameter.
    fn name(&self) -> &str;

    /// Current target list.
    async fn targets(&self) -> Result<Vec<Target>, SourceError>;
}

/// Normalize, parse and map a raw byte stream in one pass.
pub fn parse_targets<R>(raw: R, config: &SourceConfig) -> Result<Vec<Target>, SourceError>
where
    R: Read + Send + 'static,
{
    let (encoding, text) = normalize::normalize(raw, &config.parse.comment_prefix)
        .map_err(csv::Error::from)?;
    tracing::debug!(source = %config.name, encoding = encoding.as_str(), "Source encoding");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(config.parse.delimiter)
        .flexible(!config.parse.strict_columns)
        .from_reader(text);

    let mut targets = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<&str> = record.iter().collect();
        if let Some(target) = map_row(&row, &config.mapping) {
            targets.push(target);
        }
    }
    Ok(targets)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::{ColumnMapping, LabelColumn, ParseOptions, SourceKind};
    use std::io::Cursor;
    use url::Url;

    pub(crate) fn sample_config() -> SourceConfig {
        SourceConfig {
            name: "nodes".into(),
            locator: Url::parse("file:///tmp/nodes.csv").unwrap(),
            kind: SourceKind::File("/tmp/nodes.csv".into()),
            mapping: ColumnMapping {
                target_col: 0,
                labels: vec![LabelColumn {
                    col: 1,
                    label_name: "env".into(),
                }],
            },
            parse: ParseOptions {
                delimiter: b',',
                comment_prefix: "#".into(),
                strict_columns: false,
            },
        }
    }

    #[test]
    fn test_worked_example() {
        let targets = parse_targets(Cursor::new("host1,prod\n#comment\nhost2\n"), &sample_config()).unwrap();
        assert_eq!(
            serde_json::to_value(&targets).unwrap(),
            serde_json::json!([
                {"targets": ["host1"], "labels": {"env": "prod"}},
                {"targets": ["host2"]}
            ])
        );
    }

    #[test]
    fn test_indented_comment_is_parsed_as_row() {
        let targets = parse_targets(Cursor::new(" #not-a-comment,x\n#real\n"), &sample_config()).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].targets, vec![" #not-a-comment"]);
    }

    #[test]
    fn test_custom_delimiter_and_quotes() {
        let mut config = sample_config();
        config.parse.delimiter = b';';
        let targets = parse_targets(Cursor::new("\"a;b\";prod\nc,d;dev\n"), &config).unwrap();
        assert_eq!(targets[0].targets, vec!["a;b"]);
        assert_eq!(targets[1].targets, vec!["c,d"]);
        assert_eq!(targets[1].labels.as_ref().unwrap()["env"], "dev");
    }

    #[test]
    fn test_strict_columns_rejects_ragged_rows() {
        let mut config = sample_config();
        config.parse.strict_columns = true;
        let err = parse_targets(Cursor::new("host1,prod\nhost2\n"), &config).unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn test_rows_shorter_than_target_column_skipped() {
        let mut config = sample_config();
        config.mapping.target_col = 2;
        let targets = parse_targets(Cursor::new("a,b,c\nd,e\nf,g,h,i\n"), &config).unwrap();
        let addresses: Vec<_> = targets.iter().map(|t| t.targets[0].as_str()).collect();
        assert_eq!(addresses, vec!["c", "h"]);
    }

    #[test]
    fn test_utf16_source_parsed() {
        let mut raw = vec![0xFF, 0xFE];
        for unit in "host1,prod\n".encode_utf16() {
            raw.extend_from_slice(&unit.to_le_bytes());
        }
        let targets = parse_targets(Cursor::new(raw), &sample_config()).unwrap();
        assert_eq!(targets[0].targets, vec!["host1"]);
        assert_eq!(targets[0].labels.as_ref().unwrap()["env"], "prod");
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let err = parse_targets(Cursor::new(vec![b'a', 0xFF, b'\n']), &sample_config()).unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
