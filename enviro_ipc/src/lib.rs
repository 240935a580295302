//! # ENVIRO field transports
//!
//! The communication layer between an environmental field process and the
//! plant-growth driver (cpfg/lpfg). Three interchangeable transports carry
//! the same line-oriented wire format:
//!
//! - **Memory**: a duplex System V shared-memory record plus a semaphore
//!   pair, both created by the driver and only attached here
//! - **Files**: two exchange files plus the same semaphore pair
//! - **Pipes**: the inherited stdin/stdout, ordered by the protocol itself
//!
//! ## Turn-taking
//!
//! ```text
//! ┌─────────────┐  sem 0 (input ready)   ┌─────────────┐
//! │   Driver    ├───────────────────────►│    Field    │
//! │ cpfg / lpfg │                        │   process   │
//! │             │◄───────────────────────┤             │
//! └─────────────┘  sem 1 (output ready)  └─────────────┘
//! ```
//!
//! The field waits on semaphore 0 and raises semaphore 1, never the
//! reverse. Waits have no timeout.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use enviro_ipc::{ChannelConfig, ChannelKind, open_channel};
//!
//! # fn main() -> Result<(), enviro_ipc::IpcError> {
//! let config = ChannelConfig {
//!     kind: ChannelKind::Memory,
//!     semaphore_key: 4242,
//!     ..ChannelConfig::default()
//! };
//! let mut channel = open_channel(&config)?;
//! channel.begin_output()?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod error;
pub mod platform;
pub mod segment;
pub mod semaphore;
#[cfg(feature = "test-support")]
pub mod testing;

pub use channel::{
    Channel, ChannelConfig, ChannelKind, FileChannel, MemoryChannel, PipeChannel, StdioChannel,
    open_channel,
};
pub use error::{IpcError, IpcResult};
pub use segment::{SHARED_BUFFER_SIZE, SharedBuffer};
pub use semaphore::{Handshake, SemaphorePair};

/// Initialize tracing on stderr; stdout may be the pipe transport.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
