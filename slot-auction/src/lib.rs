mod auction;
mod clock;
mod config;
mod error;
mod events;
mod ledger;

pub use auction::SlotAuction;
pub use clock::{SlotClock, slot_of};
pub use config::{AllocationRatio, AuctionConfig, AuctionSetup};
pub use error::AuctionError;
pub use events::AuctionEvent;
pub use ledger::{BidLedger, Coordinator, SlotState};

/// Number of blocks in a slot.
pub const BLOCKS_PER_SLOT: u64 = 40;

/// Minimum distance between the initialising block and the genesis block.
pub const MIN_BLOCKS: u64 = 81;

/// Number of slot sets. A slot belongs to set `slot % SLOT_SETS`.
pub const SLOT_SETS: usize = 6;

/// Upper bound on the open (and so the closed) auction slot count.
pub const MAX_AUCTION_SLOTS: u64 = u16::MAX as u64;

/// Initial default price of every slot set (one million tokens, 18 decimals).
pub const INITIAL_MINIMAL_BIDDING: u128 = 1_000_000 * 10u128.pow(18);
