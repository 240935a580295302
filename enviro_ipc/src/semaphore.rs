//! Two-semaphore handshake with the driver process.
//!
//! Semaphore 0 is raised by the driver when the field may read its input;
//! semaphore 1 is raised by the field when the driver may read the reply.
//! The field only ever waits on 0 and raises 1, so at most one party owns
//! the exchange medium at a time.

use crate::error::IpcResult;
use crate::platform::{sem_adjust, sem_attach, sem_set_value, sem_value};
use enviro::consts::{SEM_INPUT_READY, SEM_OUTPUT_READY};
use tracing::{debug, trace};

/// Turn-taking discipline shared by the memory and files channels.
pub trait Handshake {
    /// Block until the driver hands the field its turn.
    fn wait_input(&mut self) -> IpcResult<()>;

    /// Hand the turn back to the driver.
    fn signal_output(&mut self) -> IpcResult<()>;
}

/// System V semaphore pair created by the driver
#[derive(Debug)]
pub struct SemaphorePair {
    id: i32,
    key: i32,
}

impl SemaphorePair {
    /// Attach the pair under `key` and reset the field's own
    /// output-ready semaphore to 0.
    ///
    /// The reset happens once here and never on exit; the driver is
    /// assumed to recreate the set for every run.
    ///
    /// # Errors
    /// `IpcError::SemaphoresNotFound` if the driver has not created the set.
    pub fn attach(key: i32) -> IpcResult<Self> {
        let id = sem_attach(key, 2)?;
        sem_set_value(id, SEM_OUTPUT_READY, 0)?;
        debug!(key, id, "attached semaphore pair");
        Ok(Self { id, key })
    }

    /// System V key of the set.
    pub fn key(&self) -> i32 {
        self.key
    }

    /// Current value of the output-ready semaphore.
    pub fn output_ready_value(&self) -> IpcResult<i32> {
        sem_value(self.id, SEM_OUTPUT_READY)
    }
}

impl Handshake for SemaphorePair {
    fn wait_input(&mut self) -> IpcResult<()> {
        trace!(key = self.key, "waiting for input-ready");
        sem_adjust(self.id, SEM_INPUT_READY, -1)
    }

    fn signal_output(&mut self) -> IpcResult<()> {
        trace!(key = self.key, "raising output-ready");
        sem_adjust(self.id, SEM_OUTPUT_READY, 1)
    }
}
