//! Token reader over the active channel.

use enviro_ipc::{Channel, IpcResult};

use crate::tokenizer::{SeparatorSet, next_token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Episode {
    #[default]
    Idle,
    Open,
    Exhausted,
}

/// Pulls one token at a time from a channel, refilling from the next line
/// when the current one runs out.
///
/// An input episode starts with the first call after [`LineReader::reset`]
/// and ends at end of stream; until the next reset, further calls keep
/// returning `None`.
#[derive(Debug, Default)]
pub struct LineReader {
    line: String,
    offset: usize,
    episode: Episode,
}

impl LineReader {
    /// Reader with no episode open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the current episode.
    pub fn reset(&mut self) {
        self.line.clear();
        self.offset = 0;
        self.episode = Episode::Idle;
    }

    /// Whether the last episode ran into end of stream.
    pub fn is_exhausted(&self) -> bool {
        self.episode == Episode::Exhausted
    }

    /// Next token, or `None` when the episode's input is used up.
    pub fn load_one_token(
        &mut self,
        channel: &mut dyn Channel,
        separators: &SeparatorSet,
    ) -> IpcResult<Option<String>> {
        match self.episode {
            Episode::Exhausted => return Ok(None),
            Episode::Idle => {
                channel.open_input()?;
                self.line.clear();
                self.offset = 0;
                self.episode = Episode::Open;
            }
            Episode::Open => {}
        }

        loop {
            let found = next_token(&self.line[self.offset..], separators)
                .map(|(token, rest)| (token.to_string(), self.line.len() - rest.len()));
            if let Some((token, offset)) = found {
                self.offset = offset;
                return Ok(Some(token));
            }

            match channel.read_line()? {
                Some(line) => {
                    self.line = line;
                    self.offset = 0;
                }
                None => {
                    channel.close_input()?;
                    self.line.clear();
                    self.offset = 0;
                    self.episode = Episode::Exhausted;
                    return Ok(None);
                }
            }
        }
    }
}
