use std::collections::{BTreeMap, HashMap};

use rollup_types::{Address, SlotNumber};
use serde::{Deserialize, Serialize};

/// A registered bidder identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinator {
    /// The account that forges on behalf of the bidder.
    pub forger: Address,
    pub url: String,
}

/// Bid record of a slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotState {
    /// Current highest bidder.
    pub bidder: Address,
    /// Current highest bid, zero if nobody bid.
    pub bid_amount: u128,
    /// Default price frozen for this slot once it closed, zero if not frozen.
    pub closed_min_bid: u128,
    /// The slot has been settled by its first forge.
    pub fulfilled: bool,
    /// A forger forged before the slot deadline.
    pub forger_commitment: bool,
}

impl SlotState {
    /// The current highest bid, if any.
    pub fn highest(&self) -> Option<(Address, u128)> {
        (self.bid_amount != 0).then_some((self.bidder, self.bid_amount))
    }
}

/// Coordinators, per-slot bids and claimable balances.
#[derive(Debug, Default)]
pub struct BidLedger {
    coordinators: HashMap<Address, Coordinator>,
    slots: BTreeMap<SlotNumber, SlotState>,
    pending: HashMap<Address, u128>,
}

impl BidLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coordinator(&self, bidder: &Address) -> Option<&Coordinator> {
        self.coordinators.get(bidder)
    }

    /// Register or update the coordinator of `bidder`.
    pub fn set_coordinator(&mut self, bidder: Address, c: Coordinator) -> Option<Coordinator> {
        self.coordinators.insert(bidder, c)
    }

    pub fn slot(&self, s: SlotNumber) -> SlotState {
        self.slots.get(&s).cloned().unwrap_or_default()
    }

    pub fn slot_mut(&mut self, s: SlotNumber) -> &mut SlotState {
        self.slots.entry(s).or_default()
    }

    /// Make `bidder` the highest bidder of `slot`, returning the replaced bid.
    pub fn record_bid(
        &mut self,
        slot: SlotNumber,
        bidder: Address,
        amount: u128,
    ) -> Option<(Address, u128)> {
        let s = self.slot_mut(slot);
        let previous = s.highest();
        s.bidder = bidder;
        s.bid_amount = amount;
        previous
    }

    pub fn pending(&self, owner: &Address) -> u128 {
        self.pending.get(owner).copied().unwrap_or(0)
    }

    /// Would crediting `amount` to `owner` fit?
    pub fn can_credit(&self, owner: &Address, amount: u128) -> bool {
        self.pending(owner).checked_add(amount).is_some()
    }

    /// Add to the claimable balance of `owner`, returning the new balance.
    pub fn credit(&mut self, owner: Address, amount: u128) -> Option<u128> {
        let b = self.pending.entry(owner).or_default();
        *b = b.checked_add(amount)?;
        Some(*b)
    }

    /// Remove and return the claimable balance of `owner`.
    pub fn take_pending(&mut self, owner: &Address) -> u128 {
        self.pending.remove(owner).unwrap_or(0)
    }
}
