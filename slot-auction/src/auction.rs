use std::collections::HashMap;
use std::fmt;

use alloy_primitives::U256;
use parking_lot::Mutex;
use rollup_types::abi::call_succeeded;
use rollup_types::{Address, BASIS_POINTS, BlockNumber, Call, Chain, Entered};
use rollup_types::{ReentrancyGuard, SlotNumber, TokenCall};
use tracing::{debug, info, warn};

use crate::config::{check_auction_slots, valid_outbidding};
use crate::{AllocationRatio, AuctionConfig, AuctionError, AuctionEvent, AuctionSetup};
use crate::{BLOCKS_PER_SLOT, BidLedger, Coordinator, MIN_BLOCKS, SLOT_SETS, SlotClock, SlotState};

/// Auction of forging slots.
///
/// Coordinators register, then bid in the settlement token for future
/// slots. The highest bid of a slot wins the exclusive right to forge in
/// it; a slot without a qualifying bid is forged by the boot coordinator.
/// The first forge in a slot settles the winning bid.
///
/// All operations take `&self`. Each one runs under a reentrancy guard,
/// and the state lock is never held while calling into the token.
pub struct SlotAuction<C> {
    address: Address,
    chain: C,
    guard: ReentrancyGuard,
    state: Mutex<Instance>,
}

/// Initialisation happens exactly once.
enum Instance {
    Uninitialized,
    Ready(Box<State>),
}

struct State {
    token: Address,
    clock: SlotClock,
    governance: Address,
    rollup: Address,
    donation: Address,
    boot_coordinator: Address,
    boot_coordinator_url: String,
    config: AuctionConfig,
    ledger: BidLedger,
    events: Vec<AuctionEvent>,
}

/// What the first forge of a slot does with its bid.
#[derive(Debug, Clone, Copy)]
enum Settlement {
    /// Nothing to settle.
    Nothing,
    /// The bid ended below the slot's closed minimum and goes back.
    Refund { bidder: Address, amount: u128 },
    /// The bid is split between burn, donation and governance.
    Allocate {
        bidder: Address,
        burn: u128,
        donation: u128,
        governance: u128,
    },
}

impl<C> fmt::Debug for SlotAuction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotAuction")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl<C: Chain> SlotAuction<C> {
    /// Create an uninitialised auction living at `address`.
    pub fn new(address: Address, chain: C) -> Self {
        Self {
            address,
            chain,
            guard: ReentrancyGuard::new(),
            state: Mutex::new(Instance::Uninitialized),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn initialize(
        &self,
        call: &Call,
        setup: AuctionSetup,
        config: AuctionConfig,
    ) -> Result<(), AuctionError> {
        let _e = self.enter()?;
        let mut inst = self.state.lock();
        if matches!(*inst, Instance::Ready(_)) {
            return Err(AuctionError::AlreadyInitialized);
        }
        let earliest = call
            .block
            .checked_add(MIN_BLOCKS)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        if setup.genesis_block < earliest {
            return Err(AuctionError::GenesisTooSoon {
                genesis: setup.genesis_block,
                earliest,
            });
        }
        if [setup.token, setup.governance, setup.rollup, setup.donation_address]
            .contains(&Address::ZERO)
        {
            return Err(AuctionError::ZeroAddress);
        }
        config.validate()?;

        info!(
            auction = %self.address,
            token   = %setup.token,
            genesis = %setup.genesis_block,
            "auction initialized"
        );

        let event = AuctionEvent::Initialized {
            token: setup.token,
            genesis_block: setup.genesis_block,
            donation_address: setup.donation_address,
            boot_coordinator: setup.boot_coordinator,
            boot_coordinator_url: setup.boot_coordinator_url.clone(),
            outbidding: config.outbidding,
            slot_deadline: config.slot_deadline,
            closed_auction_slots: config.closed_auction_slots,
            open_auction_slots: config.open_auction_slots,
            allocation_ratio: config.allocation_ratio,
        };

        *inst = Instance::Ready(Box::new(State {
            token: setup.token,
            clock: SlotClock::new(setup.genesis_block),
            governance: setup.governance,
            rollup: setup.rollup,
            donation: setup.donation_address,
            boot_coordinator: setup.boot_coordinator,
            boot_coordinator_url: setup.boot_coordinator_url,
            config,
            ledger: BidLedger::new(),
            events: vec![event],
        }));

        Ok(())
    }

    /// Register the caller as a bidder forging through `forger`.
    ///
    /// Calling it again replaces forger and url of the caller.
    pub fn register_coordinator(
        &self,
        call: &Call,
        forger: Address,
        url: &str,
    ) -> Result<(), AuctionError> {
        let _e = self.enter()?;
        if url.is_empty() {
            return Err(AuctionError::InvalidUrl);
        }
        self.write(|s| {
            let c = Coordinator {
                forger,
                url: url.to_string(),
            };
            let previous = s.ledger.set_coordinator(call.sender, c);
            debug!(
                bidder  = %call.sender,
                %forger,
                %url,
                update  = previous.is_some(),
                "coordinator registered"
            );
            s.emit(AuctionEvent::SetCoordinator {
                bidder: call.sender,
                forger,
                url: url.to_string(),
            });
            Ok(())
        })
    }

    /// Bid `amount` for `slot`.
    ///
    /// The amount is pulled from the caller, who must have approved it,
    /// and the bid it replaces is returned to its bidder. Should returning
    /// the replaced bid fail, it is credited to the bidder's claimable
    /// balance instead.
    pub fn bid(&self, call: &Call, slot: SlotNumber, amount: u128) -> Result<(), AuctionError> {
        let _e = self.enter()?;

        let (token, previous) = self.read(|s| {
            s.ensure_coordinator(&call.sender)?;
            s.ensure_biddable(call.block, slot)?;
            let min = s.min_bid(slot)?;
            if amount == 0 || amount < min {
                debug!(%slot, amount, min, bidder = %call.sender, "bid too low");
                return Err(AuctionError::BidTooLow { slot, amount, min });
            }
            let previous = s.ledger.slot(slot).highest();
            // Pending balances and open bids are all held in the auction's
            // token balance, so this only fails for a token whose balances
            // exceed `u128`.
            s.ensure_credits(previous.iter().copied())?;
            Ok((s.token, previous))
        })?;

        self.token_call(
            token,
            TokenCall::TransferFrom {
                from: call.sender,
                to: self.address,
                amount,
            },
        )?;

        let unrefunded = previous.and_then(|(bidder, a)| self.refund(token, bidder, a));

        self.write(|s| {
            s.credit_all(unrefunded)?;
            s.ledger.record_bid(slot, call.sender, amount);
            s.emit(AuctionEvent::NewBid {
                slot,
                amount,
                bidder: call.sender,
            });
            Ok(())
        })?;

        info!(%slot, amount, bidder = %call.sender, "new bid");
        Ok(())
    }

    /// Bid on every slot in `start..=end` whose slot set is selected by
    /// `slot_mask` (bit `i` selects slot set `i`).
    ///
    /// A slot whose minimum price is at most `min_bid` receives `min_bid`.
    /// A slot whose minimum price lies above `min_bid` but not above
    /// `max_bid` receives exactly its minimum price. Slots priced above
    /// `max_bid` are skipped. The total is pulled from the caller at once.
    ///
    /// Returns the slots bid on and the amounts.
    pub fn multi_bid(
        &self,
        call: &Call,
        start: SlotNumber,
        end: SlotNumber,
        slot_mask: u8,
        max_bid: u128,
        min_bid: u128,
    ) -> Result<Vec<(SlotNumber, u128)>, AuctionError> {
        let _e = self.enter()?;

        if start > end {
            return Err(AuctionError::InvalidSlotRange { start, end });
        }
        if min_bid > max_bid {
            return Err(AuctionError::InvalidBidRange {
                min: min_bid,
                max: max_bid,
            });
        }

        let (token, total, plan) = self.read(|s| {
            if *end - *start >= s.config.open_auction_slots {
                return Err(AuctionError::InvalidSlotRange { start, end });
            }
            s.ensure_coordinator(&call.sender)?;
            s.ensure_biddable(call.block, start)?;
            s.ensure_biddable(call.block, end)?;

            let mut plan = Vec::new();
            let mut total = 0u128;
            for n in *start..=*end {
                let slot = SlotNumber::new(n);
                if slot_mask & (1u8 << s.clock.slot_set(slot)) == 0 {
                    continue;
                }
                let price = s.min_bid(slot)?;
                let amount = if price <= min_bid {
                    min_bid
                } else if price <= max_bid {
                    price
                } else {
                    continue;
                };
                if amount == 0 {
                    continue;
                }
                total = total
                    .checked_add(amount)
                    .ok_or(AuctionError::ArithmeticOverflow)?;
                plan.push((slot, amount, s.ledger.slot(slot).highest()));
            }
            s.ensure_credits(plan.iter().filter_map(|(_, _, p)| *p))?;
            Ok((s.token, total, plan))
        })?;

        if plan.is_empty() {
            debug!(%start, %end, slot_mask, bidder = %call.sender, "no slot matched");
            return Ok(Vec::new());
        }

        self.token_call(
            token,
            TokenCall::TransferFrom {
                from: call.sender,
                to: self.address,
                amount: total,
            },
        )?;

        let unrefunded = plan
            .iter()
            .filter_map(|(_, _, p)| p.and_then(|(b, a)| self.refund(token, b, a)))
            .collect::<Vec<_>>();

        self.write(|s| {
            s.credit_all(unrefunded)?;
            for (slot, amount, _) in &plan {
                s.ledger.record_bid(*slot, call.sender, *amount);
                s.emit(AuctionEvent::NewBid {
                    slot: *slot,
                    amount: *amount,
                    bidder: call.sender,
                });
            }
            Ok(())
        })?;

        info!(
            %start,
            %end,
            slots  = plan.len(),
            total,
            bidder = %call.sender,
            "multi-slot bid"
        );

        Ok(plan.into_iter().map(|(s, a, _)| (s, a)).collect())
    }

    /// Can `forger` forge at `block`?
    pub fn can_forge(&self, forger: Address, block: BlockNumber) -> Result<bool, AuctionError> {
        self.read(|s| s.can_forge(forger, block))
    }

    /// Record a forge by `forger` in the current slot.
    ///
    /// Only the rollup calls this. The first forge of a slot settles it:
    /// a qualifying bid is burned, donated and paid to governance
    /// according to the allocation ratio; a bid below the slot's closed
    /// minimum is credited back to its bidder.
    pub fn forge(&self, call: &Call, forger: Address) -> Result<(), AuctionError> {
        let _e = self.enter()?;

        let (token, slot, settlement) = self.read(|s| {
            if call.sender != s.rollup {
                return Err(AuctionError::NotAuthorized(call.sender));
            }
            let slot = s.clock.slot_of(call.block);
            if !s.can_forge(forger, call.block)? {
                debug!(%forger, %slot, block = %call.block, "can not forge");
                return Err(AuctionError::CannotForge { forger, slot });
            }
            let settlement = s.settlement(slot)?;
            s.ensure_credits(s.credits(settlement))?;
            Ok((s.token, slot, settlement))
        })?;

        if let Settlement::Allocate { burn, .. } = settlement {
            if burn > 0 {
                self.token_call(token, TokenCall::Burn { amount: burn })?;
            }
        }

        self.write(|s| {
            s.credit_all(s.credits(settlement))?;

            let deadline = s.deadline(slot);
            let closed_min_bid = s.closed_min_bid(slot);
            let st = s.ledger.slot_mut(slot);
            if call.block < deadline {
                st.forger_commitment = true
            }
            st.fulfilled = true;
            st.closed_min_bid = closed_min_bid;

            match settlement {
                Settlement::Nothing => {}
                Settlement::Refund { bidder, amount } => {
                    info!(%slot, %bidder, amount, "bid below closed minimum refunded");
                }
                Settlement::Allocate {
                    bidder,
                    burn,
                    donation,
                    governance,
                } => {
                    info!(%slot, %bidder, burn, donation, governance, "slot settled");
                    s.emit(AuctionEvent::NewForgeAllocated {
                        bidder,
                        forger,
                        slot,
                        burn,
                        donation,
                        governance,
                    })
                }
            }
            s.emit(AuctionEvent::NewForge { forger, slot });
            Ok(())
        })
    }

    /// Transfer the caller's claimable balance to the caller.
    pub fn claim_pending(&self, call: &Call) -> Result<u128, AuctionError> {
        let _e = self.enter()?;

        let (token, amount) = self.write(|s| {
            let amount = s.ledger.take_pending(&call.sender);
            if amount == 0 {
                return Err(AuctionError::NothingToClaim);
            }
            Ok((s.token, amount))
        })?;

        let transfer = TokenCall::Transfer {
            to: call.sender,
            amount,
        };
        if let Err(e) = self.token_call(token, transfer) {
            self.write(|s| s.credit_all([(call.sender, amount)]))?;
            return Err(e);
        }

        self.write(|s| {
            s.emit(AuctionEvent::PendingClaimed {
                owner: call.sender,
                amount,
            });
            Ok(())
        })?;

        info!(owner = %call.sender, amount, "pending balance claimed");
        Ok(amount)
    }

    pub fn set_slot_deadline(&self, call: &Call, deadline: u64) -> Result<(), AuctionError> {
        self.govern(call, |s| {
            if deadline > BLOCKS_PER_SLOT {
                return Err(AuctionError::InvalidSlotDeadline(deadline));
            }
            s.config.slot_deadline = deadline;
            Ok(AuctionEvent::NewSlotDeadline(deadline))
        })
    }

    pub fn set_open_auction_slots(&self, call: &Call, n: u64) -> Result<(), AuctionError> {
        self.govern(call, |s| {
            check_auction_slots(s.config.closed_auction_slots, n)?;
            s.config.open_auction_slots = n;
            Ok(AuctionEvent::NewOpenAuctionSlots(n))
        })
    }

    pub fn set_closed_auction_slots(&self, call: &Call, n: u64) -> Result<(), AuctionError> {
        self.govern(call, |s| {
            check_auction_slots(n, s.config.open_auction_slots)?;
            s.config.closed_auction_slots = n;
            Ok(AuctionEvent::NewClosedAuctionSlots(n))
        })
    }

    pub fn set_outbidding(&self, call: &Call, bps: u16) -> Result<(), AuctionError> {
        self.govern(call, |s| {
            if !valid_outbidding(bps) {
                return Err(AuctionError::InvalidOutbidding(bps));
            }
            s.config.outbidding = bps;
            Ok(AuctionEvent::NewOutbidding(bps))
        })
    }

    pub fn set_allocation_ratio(&self, call: &Call, r: AllocationRatio) -> Result<(), AuctionError> {
        self.govern(call, |s| {
            if !r.is_valid() {
                return Err(AuctionError::InvalidAllocationRatio(r));
            }
            s.config.allocation_ratio = r;
            Ok(AuctionEvent::NewAllocationRatio(r))
        })
    }

    pub fn set_donation_address(&self, call: &Call, a: Address) -> Result<(), AuctionError> {
        self.govern(call, |s| {
            if a == Address::ZERO {
                return Err(AuctionError::ZeroAddress);
            }
            s.donation = a;
            Ok(AuctionEvent::NewDonationAddress(a))
        })
    }

    pub fn set_boot_coordinator(
        &self,
        call: &Call,
        a: Address,
        url: &str,
    ) -> Result<(), AuctionError> {
        self.govern(call, |s| {
            if url.is_empty() {
                return Err(AuctionError::InvalidUrl);
            }
            s.boot_coordinator = a;
            s.boot_coordinator_url = url.to_string();
            Ok(AuctionEvent::NewBootCoordinator {
                boot_coordinator: a,
                url: url.to_string(),
            })
        })
    }

    /// Change the price of unbid slots in a slot set.
    ///
    /// Slots already closed keep the price they closed with.
    pub fn change_default_slot_set_bid(
        &self,
        call: &Call,
        slot_set: usize,
        amount: u128,
    ) -> Result<(), AuctionError> {
        self.govern(call, |s| {
            if slot_set >= SLOT_SETS {
                return Err(AuctionError::InvalidSlotSet(slot_set));
            }
            let current = s.clock.slot_of(call.block);
            for n in 0..=s.config.closed_auction_slots {
                let Some(slot) = current.checked_add(n) else {
                    break;
                };
                let frozen = s.closed_min_bid(slot);
                s.ledger.slot_mut(slot).closed_min_bid = frozen;
            }
            s.config.default_slot_set_bid[slot_set] = amount;
            Ok(AuctionEvent::NewDefaultSlotSetBid { slot_set, amount })
        })
    }

    pub fn current_slot(&self, block: BlockNumber) -> Result<SlotNumber, AuctionError> {
        self.read(|s| Ok(s.clock.slot_of(block)))
    }

    /// The smallest amount a bid for `slot` must have.
    pub fn min_bid(&self, slot: SlotNumber) -> Result<u128, AuctionError> {
        self.read(|s| s.min_bid(slot))
    }

    pub fn slot_state(&self, slot: SlotNumber) -> Result<SlotState, AuctionError> {
        self.read(|s| Ok(s.ledger.slot(slot)))
    }

    pub fn coordinator(&self, bidder: Address) -> Result<Option<Coordinator>, AuctionError> {
        self.read(|s| Ok(s.ledger.coordinator(&bidder).cloned()))
    }

    pub fn pending_balance(&self, owner: Address) -> Result<u128, AuctionError> {
        self.read(|s| Ok(s.ledger.pending(&owner)))
    }

    pub fn config(&self) -> Result<AuctionConfig, AuctionError> {
        self.read(|s| Ok(s.config.clone()))
    }

    pub fn boot_coordinator(&self) -> Result<(Address, String), AuctionError> {
        self.read(|s| Ok((s.boot_coordinator, s.boot_coordinator_url.clone())))
    }

    pub fn donation_address(&self) -> Result<Address, AuctionError> {
        self.read(|s| Ok(s.donation))
    }

    pub fn governance(&self) -> Result<Address, AuctionError> {
        self.read(|s| Ok(s.governance))
    }

    pub fn token(&self) -> Result<Address, AuctionError> {
        self.read(|s| Ok(s.token))
    }

    pub fn genesis_block(&self) -> Result<BlockNumber, AuctionError> {
        self.read(|s| Ok(s.clock.genesis()))
    }

    /// Events emitted so far.
    pub fn events(&self) -> Vec<AuctionEvent> {
        match &*self.state.lock() {
            Instance::Ready(s) => s.events.clone(),
            Instance::Uninitialized => Vec::new(),
        }
    }

    /// Remove and return the events emitted so far.
    pub fn drain_events(&self) -> Vec<AuctionEvent> {
        match &mut *self.state.lock() {
            Instance::Ready(s) => std::mem::take(&mut s.events),
            Instance::Uninitialized => Vec::new(),
        }
    }

    fn enter(&self) -> Result<Entered<'_>, AuctionError> {
        self.guard.enter().ok_or(AuctionError::Reentrancy)
    }

    fn read<F, R>(&self, f: F) -> Result<R, AuctionError>
    where
        F: FnOnce(&State) -> Result<R, AuctionError>,
    {
        match &*self.state.lock() {
            Instance::Ready(s) => f(s),
            Instance::Uninitialized => Err(AuctionError::NotInitialized),
        }
    }

    fn write<F, R>(&self, f: F) -> Result<R, AuctionError>
    where
        F: FnOnce(&mut State) -> Result<R, AuctionError>,
    {
        match &mut *self.state.lock() {
            Instance::Ready(s) => f(s),
            Instance::Uninitialized => Err(AuctionError::NotInitialized),
        }
    }

    /// Run a governance-only parameter change and emit its event.
    fn govern<F>(&self, call: &Call, f: F) -> Result<(), AuctionError>
    where
        F: FnOnce(&mut State) -> Result<AuctionEvent, AuctionError>,
    {
        let _e = self.enter()?;
        self.write(|s| {
            if call.sender != s.governance {
                return Err(AuctionError::NotAuthorized(call.sender));
            }
            let event = f(s)?;
            info!(?event, "auction parameter changed");
            s.emit(event);
            Ok(())
        })
    }

    fn token_call(&self, token: Address, call: TokenCall) -> Result<(), AuctionError> {
        let result = self.chain.call(token, self.address, call.clone());
        if call_succeeded(&result) {
            return Ok(());
        }
        warn!(auction = %self.address, %token, ?call, "token call failed");
        Err(AuctionError::TokenTransferFailed)
    }

    /// Return a replaced bid, yielding it back if the transfer failed.
    fn refund(&self, token: Address, bidder: Address, amount: u128) -> Option<(Address, u128)> {
        match self.token_call(token, TokenCall::Transfer { to: bidder, amount }) {
            Ok(()) => None,
            Err(_) => {
                warn!(%bidder, amount, "refund failed, crediting pending balance");
                Some((bidder, amount))
            }
        }
    }
}

impl State {
    fn emit(&mut self, e: AuctionEvent) {
        self.events.push(e)
    }

    fn ensure_coordinator(&self, bidder: &Address) -> Result<(), AuctionError> {
        if self.ledger.coordinator(bidder).is_none() {
            return Err(AuctionError::CoordinatorNotRegistered(*bidder));
        }
        Ok(())
    }

    fn ensure_biddable(&self, block: BlockNumber, slot: SlotNumber) -> Result<(), AuctionError> {
        let current = self.clock.slot_of(block);
        let closed_until = current.saturating_add(self.config.closed_auction_slots);
        let horizon = closed_until.saturating_add(self.config.open_auction_slots);
        if *slot > closed_until && *slot < horizon {
            return Ok(());
        }
        debug!(%slot, %current, "slot not biddable");
        Err(AuctionError::SlotNotBiddable(slot))
    }

    fn default_bid(&self, slot: SlotNumber) -> u128 {
        self.config.default_slot_set_bid[self.clock.slot_set(slot)]
    }

    fn min_bid(&self, slot: SlotNumber) -> Result<u128, AuctionError> {
        match self.ledger.slot(slot).highest() {
            None => Ok(self.default_bid(slot)),
            Some((_, amount)) => outbid(amount, self.config.outbidding),
        }
    }

    /// The price a bid must reach to win a closed slot.
    fn closed_min_bid(&self, slot: SlotNumber) -> u128 {
        match self.ledger.slot(slot).closed_min_bid {
            0 => self.default_bid(slot),
            frozen => frozen,
        }
    }

    /// Block from which anyone may forge in `slot` absent a commitment.
    fn deadline(&self, slot: SlotNumber) -> BlockNumber {
        let start = self.clock.slot_start(slot);
        BlockNumber::new(start.saturating_add(self.config.slot_deadline))
    }

    fn can_forge(&self, forger: Address, block: BlockNumber) -> Result<bool, AuctionError> {
        if block < self.clock.genesis() {
            return Err(AuctionError::AuctionNotStarted(block));
        }
        let slot = self.clock.slot_of(block);
        let st = self.ledger.slot(slot);

        if !st.forger_commitment && block >= self.deadline(slot) {
            return Ok(true);
        }

        if st.bid_amount != 0 && st.bid_amount >= self.closed_min_bid(slot) {
            let winner = self.ledger.coordinator(&st.bidder);
            return Ok(winner.is_some_and(|c| c.forger == forger));
        }

        Ok(forger == self.boot_coordinator)
    }

    fn settlement(&self, slot: SlotNumber) -> Result<Settlement, AuctionError> {
        let st = self.ledger.slot(slot);
        if st.fulfilled || st.bid_amount == 0 {
            return Ok(Settlement::Nothing);
        }
        if st.bid_amount < self.closed_min_bid(slot) {
            return Ok(Settlement::Refund {
                bidder: st.bidder,
                amount: st.bid_amount,
            });
        }
        let r = self.config.allocation_ratio;
        let burn = bps_of(st.bid_amount, r.burn)?;
        let donation = bps_of(st.bid_amount, r.donation)?;
        let governance = st
            .bid_amount
            .checked_sub(burn)
            .and_then(|x| x.checked_sub(donation))
            .ok_or(AuctionError::ArithmeticOverflow)?;
        Ok(Settlement::Allocate {
            bidder: st.bidder,
            burn,
            donation,
            governance,
        })
    }

    /// Claimable balance credits a settlement produces.
    fn credits(&self, s: Settlement) -> Vec<(Address, u128)> {
        match s {
            Settlement::Nothing => Vec::new(),
            Settlement::Refund { bidder, amount } => vec![(bidder, amount)],
            Settlement::Allocate {
                donation,
                governance,
                ..
            } => vec![(self.donation, donation), (self.governance, governance)],
        }
    }

    /// Check that crediting all of `credits` can not overflow.
    fn ensure_credits<I>(&self, credits: I) -> Result<(), AuctionError>
    where
        I: IntoIterator<Item = (Address, u128)>,
    {
        let mut sums: HashMap<Address, u128> = HashMap::new();
        for (who, amount) in credits {
            let sum = sums.entry(who).or_default();
            *sum = sum
                .checked_add(amount)
                .ok_or(AuctionError::ArithmeticOverflow)?;
            if !self.ledger.can_credit(&who, *sum) {
                return Err(AuctionError::ArithmeticOverflow);
            }
        }
        Ok(())
    }

    fn credit_all<I>(&mut self, credits: I) -> Result<(), AuctionError>
    where
        I: IntoIterator<Item = (Address, u128)>,
    {
        for (who, amount) in credits {
            self.ledger
                .credit(who, amount)
                .ok_or(AuctionError::ArithmeticOverflow)?;
        }
        Ok(())
    }
}

/// `amount * bps / 10000`, rounded down.
fn bps_of(amount: u128, bps: u16) -> Result<u128, AuctionError> {
    let x = U256::from(amount) * U256::from(bps) / U256::from(BASIS_POINTS);
    u128::try_from(x).map_err(|_| AuctionError::ArithmeticOverflow)
}

/// The smallest bid that outbids `amount`.
///
/// Always strictly greater than `amount`, even where the raise rounds
/// down to zero.
fn outbid(amount: u128, bps: u16) -> Result<u128, AuctionError> {
    let raised = amount
        .checked_add(bps_of(amount, bps)?)
        .ok_or(AuctionError::ArithmeticOverflow)?;
    let next = amount
        .checked_add(1)
        .ok_or(AuctionError::ArithmeticOverflow)?;
    Ok(raised.max(next))
}

#[cfg(test)]
mod tests {
    use super::{bps_of, outbid};
    use crate::AuctionError;

    #[test]
    fn basis_points() {
        assert_eq!(bps_of(10_000, 1000), Ok(1000));
        assert_eq!(bps_of(9_999, 1), Ok(0));
        assert_eq!(bps_of(u128::MAX, 10_000), Ok(u128::MAX));
        assert_eq!(bps_of(u128::MAX, 5000), Ok(u128::MAX / 2));
    }

    #[test]
    fn outbidding() {
        assert_eq!(outbid(100, 1000), Ok(110));
        assert_eq!(outbid(1, 1000), Ok(2));
        assert_eq!(outbid(9, 1000), Ok(10));
        assert_eq!(outbid(0, 1000), Ok(1));
        assert_eq!(outbid(u128::MAX, 1000), Err(AuctionError::ArithmeticOverflow));
    }
}
