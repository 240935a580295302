//! Prelude module for common re-exports.
//!
//! Consumers can do `use enviro_common::prelude::*;` and get the protocol
//! types and limits without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use enviro_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── Protocol Limits ────────────────────────────────────────────────
pub use crate::consts::{
    CONTROL_HEADROOM, FROM_FIELD_LENGTH, MAX_PARAM, MAX_QUERIES_IN_FILE, TO_FIELD_LENGTH,
};

// ─── Protocol Types ─────────────────────────────────────────────────
pub use crate::module::{Module, ModuleError, Params};
pub use crate::protocol::{ChunkFlags, control_line};
