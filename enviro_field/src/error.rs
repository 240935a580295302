//! Field-process error type.

use enviro::config::ConfigError;
use enviro_ipc::IpcError;
use thiserror::Error;

use crate::parser::ParseError;

/// Errors surfaced by the exchange and the run loop.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Transport failure
    #[error(transparent)]
    Ipc(#[from] IpcError),

    /// Malformed protocol input
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Bad configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reply item larger than an empty chunk
    #[error("reply item of {len} bytes does not fit in an empty chunk")]
    ItemTooLarge {
        /// Item length in bytes
        len: usize,
    },
}

impl FieldError {
    /// True for failures before any data exchange.
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::Ipc(e) if e.is_setup())
    }
}

/// Result type of the field process
pub type FieldResult<T> = Result<T, FieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_ipc_objects_are_setup_failures() {
        assert!(FieldError::from(IpcError::SemaphoresNotFound { key: 3 }).is_setup());
        assert!(!FieldError::from(ParseError::MissingSymbol).is_setup());
        assert!(!FieldError::ItemTooLarge { len: 200_000 }.is_setup());
    }
}
