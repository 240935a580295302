//! # ENVIRO soil field
//!
//! Field-process side of the ENVIRO protocol. Each simulation step the
//! driver sends a batch of queries, one per communication module in the
//! plant string, optionally followed by turtle-state lines; the field
//! answers every query by index with a replacement module.
//!
//! ## Wire format
//!
//! ```text
//! 7E(A(0.5))(B(1,2))       query: index, communication module, next module
//! P: 1.0 2.0 0.0           turtle lines enabled by the environment file
//! Control: 3 12            chunk flags and step number
//! ```
//!
//! Replies are `index module` lines closed by `Control: <flags>`.
//!
//! ## Modules
//!
//! - [`tokenizer`]: separator-set tokenizer shared by every parser
//! - [`parser`]: query, module and control-line grammar
//! - [`turtle`]: turtle-state fields and their decoding
//! - [`environment`]: the environment-description file
//! - [`reader`]: line reader over a transport
//! - [`exchange`]: the get/send state machines with chunk splitting
//! - [`process`]: the [`FieldProcess`] interface and the run loop

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod environment;
pub mod error;
pub mod exchange;
pub mod parser;
pub mod process;
pub mod reader;
pub mod settings;
pub mod tokenizer;
pub mod turtle;

pub use environment::EnvironmentDescription;
pub use error::{FieldError, FieldResult};
pub use exchange::{FieldSession, GetStage, Query, SendStage};
pub use process::{EchoField, FieldProcess, ReplySink, run};
pub use turtle::{TurtleSpec, TurtleState};
