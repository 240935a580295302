//! Chunk flags carried by `Control:` lines.

use bitflags::bitflags;

use crate::consts::CONTROL_PREFIX;

bitflags! {
    /// Bitwise OR of the chunk markers exchanged in control lines.
    ///
    /// A reply that fits in one physical chunk carries
    /// `FIRST_CHUNK | LAST_CHUNK`. When a reply is split, only the first
    /// chunk keeps `FIRST_CHUNK` and only the last keeps `LAST_CHUNK`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChunkFlags: u32 {
        /// First physical chunk of a logical message.
        const FIRST_CHUNK = 1;
        /// Last physical chunk of a logical message.
        const LAST_CHUNK = 2;
        /// The driver is shutting the field process down.
        const PROCESS_EXIT = 4;
    }
}

impl ChunkFlags {
    /// Flags of a message that fits in a single chunk.
    pub const WHOLE: Self = Self::FIRST_CHUNK.union(Self::LAST_CHUNK);

    /// Decode the integer written on the wire, ignoring unknown bits.
    #[inline]
    pub const fn from_wire(value: i64) -> Self {
        Self::from_bits_truncate(value as u32)
    }

    /// True when the current input episode is over.
    #[inline]
    pub const fn ends_episode(self) -> bool {
        self.intersects(Self::LAST_CHUNK.union(Self::PROCESS_EXIT))
    }
}

/// Trailing record of an outgoing chunk: `Control: <flags>\n`.
pub fn control_line(flags: ChunkFlags) -> String {
    format!("{CONTROL_PREFIX} {}\n", flags.bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_line_format() {
        assert_eq!(control_line(ChunkFlags::WHOLE), "Control: 3\n");
        assert_eq!(
            control_line(ChunkFlags::LAST_CHUNK | ChunkFlags::PROCESS_EXIT),
            "Control: 6\n"
        );
    }

    #[test]
    fn wire_values() {
        assert_eq!(ChunkFlags::FIRST_CHUNK.bits(), 1);
        assert_eq!(ChunkFlags::LAST_CHUNK.bits(), 2);
        assert_eq!(ChunkFlags::PROCESS_EXIT.bits(), 4);
        assert_eq!(ChunkFlags::WHOLE.bits(), 3);
    }

    #[test]
    fn unknown_bits_are_dropped() {
        assert_eq!(ChunkFlags::from_wire(0xff), ChunkFlags::all());
        assert_eq!(ChunkFlags::from_wire(8), ChunkFlags::empty());
    }

    #[test]
    fn episode_end_detection() {
        assert!(!ChunkFlags::FIRST_CHUNK.ends_episode());
        assert!(!ChunkFlags::empty().ends_episode());
        assert!(ChunkFlags::LAST_CHUNK.ends_episode());
        assert!(ChunkFlags::PROCESS_EXIT.ends_episode());
        assert!(ChunkFlags::WHOLE.ends_episode());
    }
}
