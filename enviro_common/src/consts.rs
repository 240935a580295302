//! Protocol constants for the field-process communication layer.
//!
//! Single source of truth for buffer capacities and protocol limits.
//! The shared-memory layout must match the one the driver process
//! (cpfg/lpfg) allocates, so these are not tunables.

use static_assertions::const_assert;

/// Maximum number of parameters carried by one module.
pub const MAX_PARAM: usize = 20;

/// Capacity of the driver→field half of the shared buffer, in bytes.
pub const TO_FIELD_LENGTH: usize = 100_000;

/// Capacity of the field→driver half of the shared buffer, in bytes.
pub const FROM_FIELD_LENGTH: usize = 100_000;

/// Bytes reserved at the end of every outgoing shared-memory chunk for the
/// trailing control line.
pub const CONTROL_HEADROOM: usize = 25;

/// Maximum number of reply items written to one output file before the
/// exchange starts a new chunk.
pub const MAX_QUERIES_IN_FILE: usize = 1000;

/// Upper bound on the number of values in one optional turtle field.
pub const MAX_TURTLE_PARAMS: usize = 3;

/// Byte written on stdout in pipe mode after start-up and before exit.
pub const CONFIRMATION_BYTE: u8 = 1;

/// Literal prefix of a control line.
pub const CONTROL_PREFIX: &str = "Control:";

/// Stem of the driver→field exchange file (files transport).
pub const TO_FIELD_FILE: &str = "to_field";

/// Stem of the field→driver exchange file (files transport).
pub const FROM_FIELD_FILE: &str = "from_field";

/// Index of the semaphore the driver raises when the field may read.
pub const SEM_INPUT_READY: u16 = 0;

/// Index of the semaphore the field raises when the driver may read.
pub const SEM_OUTPUT_READY: u16 = 1;

const_assert!(FROM_FIELD_LENGTH > CONTROL_HEADROOM + 1);
const_assert!(MAX_TURTLE_PARAMS == 3);
const_assert!(MAX_PARAM > 0);
