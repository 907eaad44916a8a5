use rollup_types::{Address, BlockNumber, ErrorKind, SlotNumber};

use crate::AllocationRatio;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum AuctionError {
    #[error("auction is not initialized")]
    NotInitialized,

    #[error("auction is already initialized")]
    AlreadyInitialized,

    #[error("genesis block {genesis} is before the earliest allowed block {earliest}")]
    GenesisTooSoon {
        genesis: BlockNumber,
        earliest: BlockNumber,
    },

    #[error("coordinator url must not be empty")]
    InvalidUrl,

    #[error("{0} is not a registered coordinator")]
    CoordinatorNotRegistered(Address),

    #[error("slot {0} does not accept bids")]
    SlotNotBiddable(SlotNumber),

    #[error("bid of {amount} for slot {slot} is below the minimum of {min}")]
    BidTooLow {
        slot: SlotNumber,
        amount: u128,
        min: u128,
    },

    #[error("invalid slot range {start}..={end}")]
    InvalidSlotRange { start: SlotNumber, end: SlotNumber },

    #[error("minimum bid {min} exceeds maximum bid {max}")]
    InvalidBidRange { min: u128, max: u128 },

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("token transfer failed")]
    TokenTransferFailed,

    #[error("{0} is not authorized")]
    NotAuthorized(Address),

    #[error("auction has not started at block {0}")]
    AuctionNotStarted(BlockNumber),

    #[error("{forger} can not forge in slot {slot}")]
    CannotForge { forger: Address, slot: SlotNumber },

    #[error("nothing to claim")]
    NothingToClaim,

    #[error("slot deadline {0} exceeds the slot length")]
    InvalidSlotDeadline(u64),

    #[error("outbidding of {0} basis points is out of range")]
    InvalidOutbidding(u16),

    #[error("allocation ratio {0:?} does not sum to 10000")]
    InvalidAllocationRatio(AllocationRatio),

    #[error("closed auction slots ({closed}) must be fewer than open auction slots ({open})")]
    InvalidAuctionSlots { closed: u64, open: u64 },

    #[error("{0} auction slots exceed the maximum of {max}", max = crate::MAX_AUCTION_SLOTS)]
    TooManyAuctionSlots(u64),

    #[error("slot set {0} does not exist")]
    InvalidSlotSet(usize),

    #[error("address must not be zero")]
    ZeroAddress,

    #[error("reentrant call")]
    Reentrancy,
}

impl AuctionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GenesisTooSoon { .. }
            | Self::InvalidUrl
            | Self::InvalidSlotRange { .. }
            | Self::InvalidBidRange { .. }
            | Self::BidTooLow { .. }
            | Self::InvalidSlotDeadline(_)
            | Self::InvalidOutbidding(_)
            | Self::InvalidAllocationRatio(_)
            | Self::InvalidAuctionSlots { .. }
            | Self::TooManyAuctionSlots(_)
            | Self::InvalidSlotSet(_)
            | Self::ZeroAddress => ErrorKind::PreconditionViolation,

            Self::NotAuthorized(_)
            | Self::CoordinatorNotRegistered(_)
            | Self::CannotForge { .. } => ErrorKind::AuthorizationFailure,

            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::SlotNotBiddable(_)
            | Self::AuctionNotStarted(_)
            | Self::NothingToClaim
            | Self::Reentrancy => ErrorKind::StateConflict,

            Self::ArithmeticOverflow => ErrorKind::ArithmeticFailure,

            Self::TokenTransferFailed => ErrorKind::ExternalCallFailure,
        }
    }
}
