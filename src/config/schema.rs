//! Configuration schema definitions.
//!
//! These types mirror the on-disk document. They are deserialized as-is and
//! only become usable by the readers after `validation.rs` turns each
//! [`SourceEntry`] into a [`crate::config::SourceConfig`].

use serde::{Deserialize, Serialize};

/// Root configuration document.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DiscoveryConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Discovery sources served under `/prometheus-sd-targets`.
    #[serde(default)]
    pub discovery_targets: Vec<SourceEntry>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g. ":9911" or "127.0.0.1:9911").
    /// The `SERVER_ADDR` environment variable takes precedence.
    pub bind_address: String,
}

const DEFAULT_BIND_ADDRESS: &str = ":9911";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

impl ServerConfig {
    /// Socket address to bind: the first non-empty of `env_addr`,
    /// `bind_address` and `:9911`. A leading `:` binds all interfaces.
    pub fn listen_address(&self, env_addr: Option<&str>) -> String {
        let addr = [env_addr, Some(self.bind_address.as_str())]
            .into_iter()
            .flatten()
            .find(|a| !a.is_empty())
            .unwrap_or(DEFAULT_BIND_ADDRESS);
        if addr.starts_with(':') {
            format!("0.0.0.0{}", addr)
        } else {
            addr.to_string()
        }
    }
}

/// One discovery source as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceEntry {
    /// Unique name, used as the `discover` query parameter.
    pub name: String,

    /// Source URL. The scheme (`file`, `http`, `https`) selects the reader.
    pub csv_source: String,

    /// Column holding the target address.
    #[serde(default)]
    pub target_col: usize,

    /// Columns copied into the target label set.
    #[serde(default)]
    pub labels: Vec<LabelColumn>,

    /// Field delimiter. Only the first character is used.
    #[serde(default)]
    pub delimiter: String,

    /// Lines starting with this prefix are dropped before parsing.
    #[serde(default)]
    pub comment_char: String,

    /// Reject rows whose field count differs from the first row.
    #[serde(default)]
    pub strict_columns: bool,

    /// HTTP transport settings, only meaningful for http/https sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_config: Option<HttpSettings>,
}

/// Column to label mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabelColumn {
    pub col: usize,
    pub label_name: String,
}

/// HTTP transport settings for remote sources.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HttpSettings {
    /// Skip TLS certificate verification. Defaults to `true` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,
}

/// Credentials sent as an HTTP Basic `Authorization` header.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
