use rollup_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};

/// Log entries of the delayer, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayerEvent {
    /// `amount` is the accumulated deposit of the owner in the token.
    Deposit {
        owner: Address,
        token: Address,
        amount: u128,
        timestamp: Timestamp,
    },
    Withdraw {
        token: Address,
        owner: Address,
        amount: u128,
    },
    EmergencyModeEnabled,
    NewWithdrawalDelay(u64),
    EscapeHatchWithdrawal {
        who: Address,
        to: Address,
        token: Address,
        amount: u128,
    },
    NewKeeperAddress(Address),
    NewWhiteHackGroupAddress(Address),
    NewGovernanceAddress(Address),
}
