//! ENVIRO Common Library
//!
//! Shared constants, protocol types and configuration loading used by every
//! crate of the field-process workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Buffer capacities, protocol limits and well-known names
//! - [`module`] - The `Module` value exchanged with the plant-growth driver
//! - [`protocol`] - Chunk flags carried by control lines
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! Add to your `Cargo.toml` with alias for shorter imports:
//! ```toml
//! [dependencies]
//! enviro = { package = "enviro_common", path = "../enviro_common" }
//! ```
//!
//! Then import:
//! ```rust
//! use enviro_common::consts::*;
//! use enviro_common::config::{ConfigLoader, SharedConfig};
//! ```

pub mod config;
pub mod consts;
pub mod module;
pub mod prelude;
pub mod protocol;
