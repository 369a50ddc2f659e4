use std::time::Duration;

use wraith_serde::bits_for_range;

/// Wire-level settings both ends of a connection must agree on.
#[derive(Clone, Debug, PartialEq)]
pub struct Protocol {
    /// Upper bound on simultaneously bound ghost indices per viewer
    pub max_ghosts: u16,
    /// Fixed duration of one authority tick
    pub tick_interval: Duration,
    /// How many unacknowledged moves a client repeats in each move packet
    pub max_moves_per_packet: u8,
}

impl Protocol {
    pub fn ghost_index_bits(&self) -> u8 {
        bits_for_range(0, self.max_ghost_index())
    }

    pub(crate) fn max_ghost_index(&self) -> i64 {
        i64::from(self.max_ghosts.max(1)) - 1
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            max_ghosts: 1024,
            tick_interval: Duration::from_millis(32),
            max_moves_per_packet: 8,
        }
    }
}
