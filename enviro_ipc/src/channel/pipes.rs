//! Inherited-pipe transport.

use super::{Channel, ChannelKind};
use crate::error::IpcResult;
use enviro::consts::CONFIRMATION_BYTE;
use enviro::protocol::{ChunkFlags, control_line};
use std::io::{BufRead, Stdout, StdinLock, Write};
use tracing::debug;

/// Pipe channel over the process's own stdin/stdout
pub type StdioChannel = PipeChannel<StdinLock<'static>, Stdout>;

/// Exchange over a pair of synchronous streams.
///
/// There is no semaphore: both ends follow the same turn order and block
/// on the OS pipe buffer. The input stream stays open across episodes.
pub struct PipeChannel<R, W> {
    input: R,
    output: W,
}

impl StdioChannel {
    /// Channel on the inherited standard streams.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> PipeChannel<R, W> {
    /// Channel on arbitrary streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Output stream.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Split back into the two streams.
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> Channel for PipeChannel<R, W> {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Pipes
    }

    fn open_input(&mut self) -> IpcResult<()> {
        Ok(())
    }

    fn read_line(&mut self) -> IpcResult<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn close_input(&mut self) -> IpcResult<()> {
        Ok(())
    }

    fn begin_output(&mut self) -> IpcResult<()> {
        Ok(())
    }

    fn append(&mut self, item: &str, _test: bool) -> IpcResult<bool> {
        self.output.write_all(item.as_bytes())?;
        Ok(true)
    }

    fn end_output(&mut self, flags: ChunkFlags) -> IpcResult<()> {
        self.output.write_all(control_line(flags).as_bytes())?;
        self.output.flush()?;
        debug!(flags = flags.bits(), "pipe chunk flushed");
        Ok(())
    }

    fn confirm(&mut self) -> IpcResult<()> {
        self.output.write_all(&[CONFIRMATION_BYTE])?;
        self.output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn lines_survive_across_episodes() {
        let input = Cursor::new(b"1E(A)(B)\nControl: 3 1\n2E(C)(D)\n".to_vec());
        let mut channel = PipeChannel::new(input, Vec::new());
        channel.open_input().unwrap();
        assert_eq!(channel.read_line().unwrap().as_deref(), Some("1E(A)(B)"));
        assert_eq!(channel.read_line().unwrap().as_deref(), Some("Control: 3 1"));
        channel.close_input().unwrap();
        channel.open_input().unwrap();
        assert_eq!(channel.read_line().unwrap().as_deref(), Some("2E(C)(D)"));
        assert_eq!(channel.read_line().unwrap(), None);
    }

    #[test]
    fn chunk_and_confirmation_bytes() {
        let mut channel = PipeChannel::new(Cursor::new(Vec::new()), Vec::new());
        channel.confirm().unwrap();
        channel.begin_output().unwrap();
        assert!(channel.append("3 E(1)\n", true).unwrap());
        channel.end_output(ChunkFlags::WHOLE).unwrap();
        let (_, out) = channel.into_parts();
        assert_eq!(out, b"\x013 E(1)\nControl: 3\n");
    }
}
