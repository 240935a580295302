//! Duplex shared buffer exchanged with the driver process.
//!
//! Layout (matches the driver's record):
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────┐
//! │ to_field  [TO_FIELD_LENGTH]  │ from_field [FROM_FIELD_LENGTH]│
//! │ driver → field, NUL-ended    │ field → driver, NUL-ended    │
//! └──────────────────────────────┴──────────────────────────────┘
//! ```

use crate::error::{IpcError, IpcResult};
use crate::platform::{get_current_pid, shm_attach, shm_detach};
use enviro::consts::{FROM_FIELD_LENGTH, TO_FIELD_LENGTH};
use std::ptr::NonNull;
use tracing::{debug, warn};

/// Total size of the duplex record in bytes
pub const SHARED_BUFFER_SIZE: usize = TO_FIELD_LENGTH + FROM_FIELD_LENGTH;

enum Region {
    /// Segment attached from the driver; detached on drop.
    Attached { addr: NonNull<u8>, key: i32 },
    /// Process-local storage with the same layout.
    Heap(Box<[u8]>),
}

/// The `to_field` / `from_field` pair
pub struct SharedBuffer {
    region: Region,
}

impl SharedBuffer {
    /// Attach the segment created by the driver under `key`.
    ///
    /// # Errors
    /// - `IpcError::SegmentNotFound` if the driver has not created it.
    /// - `IpcError::SegmentTooSmall` if it cannot hold the duplex record.
    pub fn attach(key: i32) -> IpcResult<Self> {
        let addr = shm_attach(key, SHARED_BUFFER_SIZE)?;
        debug!(key, pid = get_current_pid(), "attached shared buffer");
        Ok(Self {
            region: Region::Attached { addr, key },
        })
    }

    /// Zeroed buffer in process memory, for running the memory channel
    /// without a driver-owned segment.
    pub fn heap() -> Self {
        Self {
            region: Region::Heap(vec![0u8; SHARED_BUFFER_SIZE].into_boxed_slice()),
        }
    }

    /// True when backed by a System V segment.
    pub fn is_attached(&self) -> bool {
        matches!(self.region, Region::Attached { .. })
    }

    fn bytes(&self) -> &[u8] {
        match &self.region {
            // SAFETY: shm_attach verified the segment spans SHARED_BUFFER_SIZE
            // bytes; the mapping lives until drop.
            Region::Attached { addr, .. } => unsafe {
                std::slice::from_raw_parts(addr.as_ptr(), SHARED_BUFFER_SIZE)
            },
            Region::Heap(bytes) => bytes,
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.region {
            // SAFETY: as above; the semaphore handshake guarantees the driver
            // is not touching the buffer while the field holds the turn.
            Region::Attached { addr, .. } => unsafe {
                std::slice::from_raw_parts_mut(addr.as_ptr(), SHARED_BUFFER_SIZE)
            },
            Region::Heap(bytes) => bytes,
        }
    }

    /// Driver → field half
    pub fn to_field(&self) -> &[u8] {
        &self.bytes()[..TO_FIELD_LENGTH]
    }

    /// Driver → field half, writable (driver side of an in-process exchange)
    pub fn to_field_mut(&mut self) -> &mut [u8] {
        &mut self.bytes_mut()[..TO_FIELD_LENGTH]
    }

    /// Field → driver half
    pub fn from_field(&self) -> &[u8] {
        &self.bytes()[TO_FIELD_LENGTH..]
    }

    /// Field → driver half, writable
    pub fn from_field_mut(&mut self) -> &mut [u8] {
        &mut self.bytes_mut()[TO_FIELD_LENGTH..]
    }

    /// Text of the incoming half up to its NUL terminator.
    pub fn incoming_text(&self) -> String {
        nul_terminated(self.to_field())
    }

    /// Text of the outgoing half up to its NUL terminator.
    pub fn outgoing_text(&self) -> String {
        nul_terminated(self.from_field())
    }

    /// Replace the incoming half with `text`, NUL-terminated.
    ///
    /// # Errors
    /// `IpcError::BufferOverrun` if `text` does not fit.
    pub fn write_incoming(&mut self, text: &str) -> IpcResult<()> {
        let bytes = text.as_bytes();
        if bytes.len() >= TO_FIELD_LENGTH {
            return Err(IpcError::BufferOverrun {
                offset: 0,
                requested: bytes.len(),
            });
        }
        let half = self.to_field_mut();
        half[..bytes.len()].copy_from_slice(bytes);
        half[bytes.len()] = 0;
        Ok(())
    }
}

impl Drop for SharedBuffer {
    fn drop(&mut self) {
        if let Region::Attached { addr, key } = self.region {
            match shm_detach(addr) {
                Ok(()) => debug!(key, "detached shared buffer"),
                Err(e) => warn!(key, "failed to detach shared buffer: {}", e),
            }
        }
    }
}

fn nul_terminated(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
