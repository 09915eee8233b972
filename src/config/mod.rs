//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML/TOML)
//!     → loader.rs (parse & deserialize into schema.rs types)
//!     → validation.rs (semantic checks, all errors collected)
//!     → Vec<SourceConfig> (validated, immutable)
//!     → one reader per source in the discovery registry
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a restart picks up changes
//! - Only the CSV files themselves are watched, never the config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod source;
pub mod validation;

pub use loader::{load_config, ConfigError, LoadedConfig};
pub use schema::{BasicAuth, DiscoveryConfig, HttpSettings, LabelColumn, ServerConfig, SourceEntry};
pub use source::{ColumnMapping, HttpOptions, ParseOptions, SourceConfig, SourceKind};
pub use validation::ValidationError;
