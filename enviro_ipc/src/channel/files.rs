//! Exchange-file transport.

use super::{Channel, ChannelKind};
use crate::error::IpcResult;
use crate::semaphore::{Handshake, SemaphorePair};
use enviro::consts::{FROM_FIELD_FILE, MAX_QUERIES_IN_FILE, TO_FIELD_FILE};
use enviro::protocol::{ChunkFlags, control_line};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exchange through two files, one per direction.
///
/// The input file is reopened for every episode and the output file is
/// truncated for every chunk. Turns are handed over with the same
/// semaphore pair as the memory transport.
pub struct FileChannel {
    input_path: PathBuf,
    output_path: PathBuf,
    handshake: Box<dyn Handshake>,
    input: Option<BufReader<File>>,
    output: Option<BufWriter<File>>,
    items: usize,
}

impl FileChannel {
    /// Use the exchange files in `directory` and attach the semaphore pair.
    pub fn attach(directory: &Path, extension: Option<&str>, semaphore_key: i32) -> IpcResult<Self> {
        let semaphores = SemaphorePair::attach(semaphore_key)?;
        Ok(Self::with_handshake(directory, extension, Box::new(semaphores)))
    }

    /// Use the exchange files in `directory` with the given handshake.
    pub fn with_handshake(
        directory: &Path,
        extension: Option<&str>,
        handshake: Box<dyn Handshake>,
    ) -> Self {
        Self {
            input_path: exchange_path(directory, TO_FIELD_FILE, extension),
            output_path: exchange_path(directory, FROM_FIELD_FILE, extension),
            handshake,
            input: None,
            output: None,
            items: 0,
        }
    }

    /// Driver → field file.
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Field → driver file.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    fn writer(&mut self) -> IpcResult<&mut BufWriter<File>> {
        let writer = match self.output.take() {
            Some(writer) => writer,
            None => BufWriter::new(File::create(&self.output_path)?),
        };
        Ok(self.output.insert(writer))
    }
}

/// `<directory>/<stem><extension>`
pub fn exchange_path(directory: &Path, stem: &str, extension: Option<&str>) -> PathBuf {
    let mut name = stem.to_string();
    if let Some(ext) = extension {
        name.push_str(ext);
    }
    directory.join(name)
}

impl Channel for FileChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Files
    }

    fn open_input(&mut self) -> IpcResult<()> {
        self.input = Some(BufReader::new(File::open(&self.input_path)?));
        Ok(())
    }

    fn read_line(&mut self) -> IpcResult<Option<String>> {
        let Some(reader) = self.input.as_mut() else {
            return Ok(None);
        };
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            self.input = None;
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn close_input(&mut self) -> IpcResult<()> {
        self.input = None;
        Ok(())
    }

    fn begin_output(&mut self) -> IpcResult<()> {
        self.handshake.wait_input()?;
        self.output = Some(BufWriter::new(File::create(&self.output_path)?));
        self.items = 0;
        Ok(())
    }

    fn append(&mut self, item: &str, test: bool) -> IpcResult<bool> {
        if test {
            if self.items >= MAX_QUERIES_IN_FILE {
                return Ok(false);
            }
            self.items += 1;
        }
        self.writer()?.write_all(item.as_bytes())?;
        Ok(true)
    }

    fn end_output(&mut self, flags: ChunkFlags) -> IpcResult<()> {
        let writer = self.writer()?;
        writer.write_all(control_line(flags).as_bytes())?;
        writer.flush()?;
        self.output = None;
        debug!(items = self.items, flags = flags.bits(), path = %self.output_path.display(), "file chunk ready");
        self.handshake.signal_output()
    }
}
