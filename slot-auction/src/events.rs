use rollup_types::{Address, BlockNumber, SlotNumber};
use serde::{Deserialize, Serialize};

use crate::AllocationRatio;

/// Log entries of the auction, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionEvent {
    Initialized {
        token: Address,
        genesis_block: BlockNumber,
        donation_address: Address,
        boot_coordinator: Address,
        boot_coordinator_url: String,
        outbidding: u16,
        slot_deadline: u64,
        closed_auction_slots: u64,
        open_auction_slots: u64,
        allocation_ratio: AllocationRatio,
    },
    NewBid {
        slot: SlotNumber,
        amount: u128,
        bidder: Address,
    },
    SetCoordinator {
        bidder: Address,
        forger: Address,
        url: String,
    },
    NewForge {
        forger: Address,
        slot: SlotNumber,
    },
    NewForgeAllocated {
        bidder: Address,
        forger: Address,
        slot: SlotNumber,
        burn: u128,
        donation: u128,
        governance: u128,
    },
    PendingClaimed {
        owner: Address,
        amount: u128,
    },
    NewSlotDeadline(u64),
    NewClosedAuctionSlots(u64),
    NewOpenAuctionSlots(u64),
    NewOutbidding(u16),
    NewAllocationRatio(AllocationRatio),
    NewDonationAddress(Address),
    NewBootCoordinator {
        boot_coordinator: Address,
        url: String,
    },
    NewDefaultSlotSetBid {
        slot_set: usize,
        amount: u128,
    },
}
