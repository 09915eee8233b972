//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build registry (starts file watchers) → Bind listener
//!
//! Shutdown:
//!     SIGTERM/SIGINT (signals.rs) → Shutdown::trigger (shutdown.rs)
//!     → HTTP server drains, file watchers exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any config error is fatal before the listener binds

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
