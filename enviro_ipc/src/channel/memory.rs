//! Shared-memory transport.

use super::{Channel, ChannelKind, take_line};
use crate::error::{IpcError, IpcResult};
use crate::segment::SharedBuffer;
use crate::semaphore::{Handshake, SemaphorePair};
use enviro::consts::{CONTROL_HEADROOM, FROM_FIELD_LENGTH};
use enviro::protocol::{ChunkFlags, control_line};
use tracing::debug;

/// Exchange through the driver's duplex shared buffer.
///
/// The segment lives under `semaphore_key - 1` and the semaphore pair under
/// `semaphore_key`; both are created by the driver.
pub struct MemoryChannel {
    buffer: SharedBuffer,
    handshake: Box<dyn Handshake>,
    incoming: String,
    cursor: usize,
    out_end: usize,
}

impl MemoryChannel {
    /// Attach the driver's segment and semaphore pair.
    pub fn attach(semaphore_key: i32) -> IpcResult<Self> {
        let buffer = SharedBuffer::attach(semaphore_key - 1)?;
        let semaphores = SemaphorePair::attach(semaphore_key)?;
        Ok(Self::with_parts(buffer, Box::new(semaphores)))
    }

    /// Build from an existing buffer and handshake.
    pub fn with_parts(buffer: SharedBuffer, handshake: Box<dyn Handshake>) -> Self {
        Self {
            buffer,
            handshake,
            incoming: String::new(),
            cursor: 0,
            out_end: 0,
        }
    }

    /// The duplex buffer.
    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    /// The duplex buffer, writable.
    pub fn buffer_mut(&mut self) -> &mut SharedBuffer {
        &mut self.buffer
    }

    /// Write offset into the outgoing half.
    pub fn out_end(&self) -> usize {
        self.out_end
    }

    fn write_outgoing(&mut self, bytes: &[u8]) -> IpcResult<()> {
        let end = self.out_end + bytes.len();
        // The terminator must land at or before FROM_FIELD_LENGTH - 1.
        if end > FROM_FIELD_LENGTH - 1 {
            return Err(IpcError::BufferOverrun {
                offset: self.out_end,
                requested: bytes.len(),
            });
        }
        let half = self.buffer.from_field_mut();
        half[self.out_end..end].copy_from_slice(bytes);
        half[end] = 0;
        self.out_end = end;
        Ok(())
    }
}

impl Channel for MemoryChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Memory
    }

    fn open_input(&mut self) -> IpcResult<()> {
        self.incoming = self.buffer.incoming_text();
        self.cursor = 0;
        Ok(())
    }

    fn read_line(&mut self) -> IpcResult<Option<String>> {
        Ok(take_line(&self.incoming, &mut self.cursor))
    }

    fn close_input(&mut self) -> IpcResult<()> {
        self.cursor = self.incoming.len();
        Ok(())
    }

    fn begin_output(&mut self) -> IpcResult<()> {
        self.handshake.wait_input()?;
        self.out_end = 0;
        self.buffer.from_field_mut()[0] = 0;
        Ok(())
    }

    fn append(&mut self, item: &str, test: bool) -> IpcResult<bool> {
        if test && self.out_end + item.len() + CONTROL_HEADROOM >= FROM_FIELD_LENGTH - 1 {
            return Ok(false);
        }
        self.write_outgoing(item.as_bytes())?;
        Ok(true)
    }

    fn end_output(&mut self, flags: ChunkFlags) -> IpcResult<()> {
        self.write_outgoing(control_line(flags).as_bytes())?;
        debug!(bytes = self.out_end, flags = flags.bits(), "memory chunk ready");
        self.handshake.signal_output()
    }
}
