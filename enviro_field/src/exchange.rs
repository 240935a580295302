//! Request/response exchange with the driver.
//!
//! Two cooperating state machines run per simulation step:
//!
//! - `get_data`: `Begin` → `Data`* → `End`, reading queries
//! - `send_data`: `Begin` → `Data`* → `End`, writing replies
//!
//! `GetStage::Begin` opens an output chunk as well, so the field always
//! waits for its turn before reading. Replies that outgrow one physical
//! chunk are split transparently; mid-stream control lines from the driver
//! are absorbed so a split request reads like a single one.

use enviro::module::Module;
use enviro::protocol::ChunkFlags;
use enviro_ipc::{Channel, ChannelKind};
use tracing::{debug, trace, warn};

use crate::error::{FieldError, FieldResult};
use crate::parser::{Control, ParseError, format_reply, parse_control_line, parse_query_line};
use crate::reader::LineReader;
use crate::tokenizer::LINE;
use crate::turtle::{TurtleSpec, TurtleState, decode_field};

/// Stage of the input state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetStage {
    /// Wait for the driver and open an input episode
    Begin,
    /// Read the next query
    Data,
    /// Close the input episode
    End,
}

/// Stage of the output state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SendStage<'a> {
    /// Wait for the turn and open a fresh chunk
    Begin,
    /// Append one reply
    Data {
        /// Query index the reply answers
        index: u32,
        /// Module sent back
        module: &'a Module,
    },
    /// Close the chunk and hand the turn back
    End,
}

/// One decoded query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Query index to echo in the reply
    pub index: u32,
    /// Communication module
    pub comm_symbol: Module,
    /// Module following it in the driver's string
    pub next_symbol: Option<Module>,
    /// Turtle fields enabled in the environment description
    pub turtle: TurtleState,
}

/// Protocol state of one field process.
pub struct FieldSession {
    channel: Box<dyn Channel>,
    reader: LineReader,
    turtle: TurtleSpec,
    in_flag: ChunkFlags,
    out_flag: ChunkFlags,
    in_num: usize,
    out_num: usize,
    step: Option<i64>,
}

impl FieldSession {
    /// Session over an opened channel.
    pub fn new(channel: Box<dyn Channel>, turtle: TurtleSpec) -> Self {
        Self {
            channel,
            reader: LineReader::new(),
            turtle,
            in_flag: ChunkFlags::empty(),
            out_flag: ChunkFlags::WHOLE,
            in_num: 0,
            out_num: 0,
            step: None,
        }
    }

    /// Active transport.
    pub fn kind(&self) -> ChannelKind {
        self.channel.kind()
    }

    /// Flags of the last control line received.
    pub fn in_flag(&self) -> ChunkFlags {
        self.in_flag
    }

    /// Flags the current output chunk will close with.
    pub fn out_flag(&self) -> ChunkFlags {
        self.out_flag
    }

    /// Queries read in the current episode.
    pub fn in_num(&self) -> usize {
        self.in_num
    }

    /// Replies written to the current chunk.
    pub fn out_num(&self) -> usize {
        self.out_num
    }

    /// Step number from the last control line that carried one.
    pub fn step(&self) -> Option<i64> {
        self.step
    }

    /// The driver asked the field to shut down.
    pub fn exit_requested(&self) -> bool {
        self.in_flag.contains(ChunkFlags::PROCESS_EXIT)
    }

    /// The last input episode hit end of stream instead of a final
    /// control line.
    pub fn stream_ended(&self) -> bool {
        self.reader.is_exhausted()
    }

    /// Send the liveness byte (pipes only).
    pub fn confirm(&mut self) -> FieldResult<()> {
        self.channel.confirm()?;
        Ok(())
    }

    /// Drive the input state machine.
    ///
    /// `GetStage::Data` yields the next query, or `None` once the driver's
    /// request is complete. A malformed query is reported, the rest of the
    /// request is read and discarded, and the step's input ends with `None`.
    pub fn get_data(&mut self, stage: GetStage) -> FieldResult<Option<Query>> {
        match stage {
            GetStage::Begin => {
                self.send_data(SendStage::Begin)?;
                self.in_flag = ChunkFlags::empty();
                self.in_num = 0;
                self.reader.reset();
                Ok(None)
            }
            GetStage::Data => self.next_query(),
            GetStage::End => {
                self.channel.close_input()?;
                Ok(None)
            }
        }
    }

    /// Drive the output state machine.
    pub fn send_data(&mut self, stage: SendStage<'_>) -> FieldResult<()> {
        match stage {
            SendStage::Begin => self.begin_chunk(ChunkFlags::WHOLE),
            SendStage::Data { index, module } => self.send_reply(index, module),
            SendStage::End => {
                trace!(flags = self.out_flag.bits(), items = self.out_num, "closing chunk");
                self.channel.end_output(self.out_flag)?;
                Ok(())
            }
        }
    }

    /// Append one item to the current chunk.
    ///
    /// With `test` set, returns `false` when the chunk is full.
    pub fn save_one_item(&mut self, item: &str, test: bool) -> FieldResult<bool> {
        Ok(self.channel.append(item, test)?)
    }

    fn begin_chunk(&mut self, flags: ChunkFlags) -> FieldResult<()> {
        self.channel.begin_output()?;
        self.out_flag = flags | (self.in_flag & ChunkFlags::PROCESS_EXIT);
        self.out_num = 0;
        Ok(())
    }

    fn send_reply(&mut self, index: u32, module: &Module) -> FieldResult<()> {
        let item = format_reply(index, module);
        self.out_num += 1;
        if self.save_one_item(&item, true)? {
            return Ok(());
        }

        debug!(items = self.out_num - 1, "output chunk full, continuing in a new one");
        self.out_flag.remove(ChunkFlags::LAST_CHUNK);
        self.send_data(SendStage::End)?;
        self.begin_chunk(ChunkFlags::LAST_CHUNK)?;

        self.out_num += 1;
        if self.save_one_item(&item, true)? {
            Ok(())
        } else {
            Err(FieldError::ItemTooLarge { len: item.len() })
        }
    }

    fn next_line(&mut self) -> FieldResult<Option<String>> {
        Ok(self.reader.load_one_token(self.channel.as_mut(), &LINE)?)
    }

    fn next_query(&mut self) -> FieldResult<Option<Query>> {
        loop {
            let Some(line) = self.next_line()? else {
                debug!(queries = self.in_num, "input stream ended");
                return Ok(None);
            };

            match parse_control_line(&line) {
                None => {}
                Some(Ok(control)) => {
                    if self.apply_control(control)? {
                        return Ok(None);
                    }
                    continue;
                }
                Some(Err(e)) => {
                    // A garbled control line still ends the request.
                    warn!("{}", e);
                    return Ok(None);
                }
            }

            self.in_num += 1;
            return match self.decode_query(&line) {
                Ok(query) => Ok(Some(query)),
                Err(FieldError::Parse(e)) => {
                    warn!("dropping step input: {}", e);
                    self.skip_request()?;
                    Ok(None)
                }
                Err(e) => Err(e),
            };
        }
    }

    /// Record a control line. Returns `true` when it ends the episode;
    /// otherwise the driver's next chunk has been opened.
    fn apply_control(&mut self, control: Control) -> FieldResult<bool> {
        self.in_flag = control.flags;
        if control.step.is_some() {
            self.step = control.step;
        }
        if control.flags.ends_episode() {
            debug!(
                queries = self.in_num,
                flags = control.flags.bits(),
                step = ?self.step,
                "input episode complete"
            );
            return Ok(true);
        }
        // More of the request follows in the driver's next chunk.
        debug!(flags = control.flags.bits(), "mid-stream control line");
        self.get_data(GetStage::End)?;
        self.send_data(SendStage::End)?;
        self.get_data(GetStage::Begin)?;
        Ok(false)
    }

    /// Discard the rest of the driver's request so the next step starts
    /// on a fresh one.
    fn skip_request(&mut self) -> FieldResult<()> {
        if self.in_flag.ends_episode() {
            return Ok(());
        }
        let mut skipped = 0usize;
        while let Some(line) = self.next_line()? {
            match parse_control_line(&line) {
                Some(Ok(control)) => {
                    if self.apply_control(control)? {
                        break;
                    }
                }
                Some(Err(_)) => break,
                None => skipped += 1,
            }
        }
        debug!(skipped, "skipped rest of request");
        Ok(())
    }

    fn decode_query(&mut self, line: &str) -> FieldResult<Query> {
        let head = parse_query_line(line)?;
        let mut turtle = TurtleState::default();
        let spec = self.turtle;
        for field in spec.enabled_fields() {
            let data = self
                .next_line()?
                .ok_or(ParseError::MissingTurtleLine { field })?;
            if let Some(Ok(control)) = parse_control_line(&data) {
                // The query is short of turtle lines; keep the control line.
                self.apply_control(control)?;
                return Err(ParseError::MissingTurtleLine { field }.into());
            }
            decode_field(field, spec.get(field), &data, &mut turtle)?;
        }
        Ok(Query {
            index: head.index,
            comm_symbol: head.comm_symbol,
            next_symbol: head.next_symbol,
            turtle,
        })
    }
}
