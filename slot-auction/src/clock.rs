use rollup_types::{BlockNumber, SlotNumber};
use serde::{Deserialize, Serialize};

use crate::{BLOCKS_PER_SLOT, SLOT_SETS};

/// Map a block height to its slot.
///
/// Blocks before genesis belong to slot 0.
///
/// # Panics
///
/// If `blocks_per_slot` is zero.
pub fn slot_of(block: BlockNumber, genesis: BlockNumber, blocks_per_slot: u64) -> SlotNumber {
    if block < genesis {
        return SlotNumber::new(0);
    }
    SlotNumber::new((*block - *genesis) / blocks_per_slot)
}

/// Slot clock anchored at a genesis block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotClock {
    genesis: BlockNumber,
}

impl SlotClock {
    pub fn new(genesis: BlockNumber) -> Self {
        Self { genesis }
    }

    pub fn genesis(&self) -> BlockNumber {
        self.genesis
    }

    pub fn slot_of(&self, block: BlockNumber) -> SlotNumber {
        slot_of(block, self.genesis, BLOCKS_PER_SLOT)
    }

    /// First block of a slot.
    pub fn slot_start(&self, slot: SlotNumber) -> BlockNumber {
        let offset = slot.saturating_mul(BLOCKS_PER_SLOT);
        BlockNumber::new(self.genesis.saturating_add(offset))
    }

    /// The slot set a slot belongs to.
    pub fn slot_set(&self, slot: SlotNumber) -> usize {
        (*slot % SLOT_SETS as u64) as usize
    }
}
