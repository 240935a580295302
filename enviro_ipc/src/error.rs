//! Error types for transport operations

use thiserror::Error;

/// Errors that can occur while setting up or driving a transport
#[derive(Error, Debug)]
pub enum IpcError {
    /// Shared-memory segment does not exist (the driver creates it)
    #[error("Shared memory segment not found for key {key}")]
    SegmentNotFound {
        /// System V key of the segment
        key: i32,
    },

    /// Attached segment is smaller than the duplex buffer layout
    #[error("Shared memory segment too small: {actual} bytes (need {expected})")]
    SegmentTooSmall {
        /// Bytes required by the buffer layout
        expected: usize,
        /// Bytes reported by the kernel
        actual: usize,
    },

    /// Semaphore set does not exist (the driver creates it)
    #[error("Semaphore set not found for key {key}")]
    SemaphoresNotFound {
        /// System V key of the semaphore set
        key: i32,
    },

    /// Write would cross the end of the outgoing buffer
    #[error("Outgoing buffer overrun: {requested} bytes at offset {offset}")]
    BufferOverrun {
        /// Current write offset
        offset: usize,
        /// Bytes that did not fit
        requested: usize,
    },

    /// IO error
    #[error("IO error: {source}")]
    Io {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },

    /// Nix system call error
    #[error("System call error: {source}")]
    Nix {
        /// Source nix error
        #[from]
        source: nix::Error,
    },
}

impl IpcError {
    /// True for failures that precede any data exchange and cannot be
    /// retried; the field process terminates on these.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Self::SegmentNotFound { .. }
                | Self::SegmentTooSmall { .. }
                | Self::SemaphoresNotFound { .. }
        )
    }
}

/// Result type for transport operations
pub type IpcResult<T> = Result<T, IpcError>;
