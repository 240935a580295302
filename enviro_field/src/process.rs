//! The field-process main loop and the interface to the field model.

use enviro::module::Module;
use enviro_ipc::ChannelKind;
use tracing::{debug, info, warn};

use crate::error::FieldResult;
use crate::exchange::{FieldSession, GetStage, Query, SendStage};

/// The environmental model answering the driver's queries.
pub trait FieldProcess {
    /// Compute the replies for one simulation step.
    ///
    /// Called once per step with every query the driver sent; replies go
    /// through `replies` and may be sent in any order.
    fn process_data(
        &mut self,
        step: Option<i64>,
        queries: &[Query],
        replies: &mut ReplySink<'_>,
    ) -> FieldResult<()>;
}

/// Output side of one step, handed to [`FieldProcess::process_data`].
pub struct ReplySink<'a> {
    session: &'a mut FieldSession,
    sent: usize,
}

impl<'a> ReplySink<'a> {
    /// Sink writing into `session`'s open chunk.
    pub fn new(session: &'a mut FieldSession) -> Self {
        Self { session, sent: 0 }
    }

    /// Reply to query `index` with `module`.
    pub fn send(&mut self, index: u32, module: &Module) -> FieldResult<()> {
        self.session.send_data(SendStage::Data { index, module })?;
        self.sent += 1;
        Ok(())
    }

    /// Replies sent so far.
    pub fn sent(&self) -> usize {
        self.sent
    }
}

/// Answers every query with its own communication module.
#[derive(Debug, Default)]
pub struct EchoField {
    answered: usize,
}

impl EchoField {
    /// Queries answered since start-up.
    pub fn answered(&self) -> usize {
        self.answered
    }
}

impl FieldProcess for EchoField {
    fn process_data(
        &mut self,
        _step: Option<i64>,
        queries: &[Query],
        replies: &mut ReplySink<'_>,
    ) -> FieldResult<()> {
        for query in queries {
            replies.send(query.index, &query.comm_symbol)?;
        }
        self.answered += queries.len();
        Ok(())
    }
}

/// Run the exchange until the driver sends `PROCESS_EXIT`.
///
/// Returns the number of steps answered. On the pipes transport the
/// confirmation byte is written at start-up and again before returning;
/// end of stdin is treated as the driver going away.
pub fn run<P: FieldProcess + ?Sized>(
    session: &mut FieldSession,
    process: &mut P,
) -> FieldResult<usize> {
    session.confirm()?;
    info!(transport = %session.kind(), "field process ready");

    let mut steps = 0;
    loop {
        session.get_data(GetStage::Begin)?;
        let mut queries = Vec::new();
        while let Some(query) = session.get_data(GetStage::Data)? {
            queries.push(query);
        }

        if session.exit_requested() {
            info!(steps, "driver requested exit");
            break;
        }
        if session.kind() == ChannelKind::Pipes && session.stream_ended() {
            warn!(steps, "driver closed the pipe without requesting exit");
            break;
        }

        let step = session.step();
        debug!(step = ?step, queries = queries.len(), "processing step");
        process.process_data(step, &queries, &mut ReplySink::new(session))?;
        session.get_data(GetStage::End)?;
        session.send_data(SendStage::End)?;
        steps += 1;
    }

    session.get_data(GetStage::End)?;
    session.confirm()?;
    Ok(steps)
}
