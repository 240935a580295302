//! The three interchangeable field transports.
//!
//! Exactly one channel is active for the lifetime of a field process.
//! All of them carry the same newline-terminated wire format; they differ
//! only in where the bytes live and how turns are handed over.

mod files;
mod memory;
mod pipes;

pub use files::{FileChannel, exchange_path};
pub use memory::MemoryChannel;
pub use pipes::{PipeChannel, StdioChannel};

use crate::error::IpcResult;
use enviro::protocol::ChunkFlags;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Transport selected at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelKind {
    /// System V shared memory plus semaphore pair
    Memory,
    /// Exchange files plus semaphore pair
    Files,
    /// Inherited stdin/stdout
    #[default]
    Pipes,
}

impl ChannelKind {
    /// Whether turns are handed over through the semaphore pair.
    pub fn uses_semaphores(self) -> bool {
        matches!(self, Self::Memory | Self::Files)
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "files" => Ok(Self::Files),
            "pipes" => Ok(Self::Pipes),
            other => Err(format!("unknown communication type '{other}'")),
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Files => "files",
            Self::Pipes => "pipes",
        })
    }
}

/// Transport selection, fixed once at start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Active transport
    pub kind: ChannelKind,
    /// System V key of the semaphore pair; the segment uses `key - 1`
    pub semaphore_key: i32,
    /// Suffix appended to both exchange file names
    pub extension: Option<String>,
    /// Directory holding the exchange files
    pub directory: PathBuf,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            kind: ChannelKind::Pipes,
            semaphore_key: 0,
            extension: None,
            directory: PathBuf::from("."),
        }
    }
}

/// Operations every transport provides to the exchange state machine.
///
/// Input is consumed in episodes: `open_input`, then `read_line` until it
/// yields `None`, then `close_input`. Output is produced in chunks:
/// `begin_output`, any number of `append`, then `end_output`.
pub trait Channel {
    /// Which transport this is.
    fn kind(&self) -> ChannelKind;

    /// Start an input episode.
    fn open_input(&mut self) -> IpcResult<()>;

    /// Next input line without its terminator, `None` at end of stream.
    fn read_line(&mut self) -> IpcResult<Option<String>>;

    /// End the current input episode.
    fn close_input(&mut self) -> IpcResult<()>;

    /// Wait for the field's turn (semaphore transports) and reset the
    /// output destination.
    fn begin_output(&mut self) -> IpcResult<()>;

    /// Append one item to the current chunk.
    ///
    /// With `test` set, returns `Ok(false)` instead of writing when the
    /// chunk has no room left; the caller then starts a new chunk. Items
    /// appended without `test` use the reserved headroom.
    fn append(&mut self, item: &str, test: bool) -> IpcResult<bool>;

    /// Write the trailing control line, close or flush the destination and
    /// hand the turn back to the driver.
    fn end_output(&mut self, flags: ChunkFlags) -> IpcResult<()>;

    /// Liveness byte for the parent; only the pipes transport sends one.
    fn confirm(&mut self) -> IpcResult<()> {
        Ok(())
    }
}

/// Open the transport described by `config`.
///
/// # Errors
/// Setup errors (`IpcError::is_setup`) when the driver-owned segment or
/// semaphore set is missing.
pub fn open_channel(config: &ChannelConfig) -> IpcResult<Box<dyn Channel>> {
    Ok(match config.kind {
        ChannelKind::Memory => Box::new(MemoryChannel::attach(config.semaphore_key)?),
        ChannelKind::Files => Box::new(FileChannel::attach(
            &config.directory,
            config.extension.as_deref(),
            config.semaphore_key,
        )?),
        ChannelKind::Pipes => Box::new(StdioChannel::stdio()),
    })
}

/// Split the lines of an in-memory episode, dropping the terminators.
pub(crate) fn take_line(text: &str, cursor: &mut usize) -> Option<String> {
    if *cursor >= text.len() {
        return None;
    }
    let rest = &text[*cursor..];
    let (line, consumed) = match rest.find('\n') {
        Some(i) => (&rest[..i], i + 1),
        None => (rest, rest.len()),
    };
    *cursor += consumed;
    Some(line.strip_suffix('\r').unwrap_or(line).to_string())
}
