//! Driver-side stand-ins for exercising channels without a driver process.

use crate::error::IpcResult;
use crate::semaphore::Handshake;
use enviro::consts::CONTROL_PREFIX;
use enviro::protocol::ChunkFlags;
use std::cell::RefCell;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

/// Handshake that never blocks and counts turns.
#[derive(Debug, Clone, Default)]
pub struct CountingHandshake {
    counts: Rc<RefCell<(usize, usize)>>,
}

impl CountingHandshake {
    /// Number of `wait_input` calls so far.
    pub fn waits(&self) -> usize {
        self.counts.borrow().0
    }

    /// Number of `signal_output` calls so far.
    pub fn signals(&self) -> usize {
        self.counts.borrow().1
    }
}

impl Handshake for CountingHandshake {
    fn wait_input(&mut self) -> IpcResult<()> {
        self.counts.borrow_mut().0 += 1;
        Ok(())
    }

    fn signal_output(&mut self) -> IpcResult<()> {
        self.counts.borrow_mut().1 += 1;
        Ok(())
    }
}

/// Handshake that plays the driver for the files transport: whenever the
/// field hands over a chunk, the output file is read and kept. Once the
/// chunk marked `LAST_CHUNK` arrives, the next scripted input (if any) is
/// written to the input file.
#[derive(Debug, Clone)]
pub struct FileDriver {
    input_path: PathBuf,
    output_path: PathBuf,
    script: Rc<RefCell<Vec<String>>>,
    chunks: Rc<RefCell<Vec<String>>>,
}

impl FileDriver {
    /// Driver for the given exchange files; `script` holds the successive
    /// contents of the input file, the first written immediately.
    pub fn new(input_path: PathBuf, output_path: PathBuf, script: Vec<String>) -> io::Result<Self> {
        let driver = Self {
            input_path,
            output_path,
            script: Rc::new(RefCell::new(script.into_iter().rev().collect())),
            chunks: Rc::default(),
        };
        driver.feed()?;
        Ok(driver)
    }

    /// Output chunks received so far, control lines included.
    pub fn chunks(&self) -> Vec<String> {
        self.chunks.borrow().clone()
    }

    fn feed(&self) -> io::Result<()> {
        if let Some(next) = self.script.borrow_mut().pop() {
            std::fs::write(&self.input_path, next)?;
        }
        Ok(())
    }
}

impl Handshake for FileDriver {
    fn wait_input(&mut self) -> IpcResult<()> {
        Ok(())
    }

    fn signal_output(&mut self) -> IpcResult<()> {
        let chunk = std::fs::read_to_string(&self.output_path)?;
        let last = chunk_flags(&chunk).contains(ChunkFlags::LAST_CHUNK);
        self.chunks.borrow_mut().push(chunk);
        if last {
            self.feed()?;
        }
        Ok(())
    }
}

/// Flags of the trailing control line of an output chunk.
pub fn chunk_flags(chunk: &str) -> ChunkFlags {
    chunk
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix(CONTROL_PREFIX))
        .and_then(|rest| rest.split_whitespace().next()?.parse::<i64>().ok())
        .map(ChunkFlags::from_wire)
        .unwrap_or_default()
}

/// Cloneable in-memory sink for pipe output.
#[derive(Debug, Clone, Default)]
pub struct SharedSink(Rc<RefCell<Vec<u8>>>);

impl SharedSink {
    /// Bytes written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    /// Bytes written so far, as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
