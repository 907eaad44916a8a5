mod config;
mod delayer;
mod deposit;
mod error;
mod events;
mod roles;

pub use config::DelayerConfig;
pub use delayer::{Mode, WithdrawalDelayer};
pub use deposit::{DepositLedger, DepositState};
pub use error::DelayerError;
pub use events::DelayerEvent;
pub use roles::{Role, Roles};

/// Upper bound of the withdrawal delay in seconds (14 days).
pub const MAX_WITHDRAWAL_DELAY: u64 = 14 * 24 * 60 * 60;

/// Seconds after enabling emergency mode until the white hack group may
/// sweep funds (26 weeks).
pub const MAX_EMERGENCY_MODE_TIME: u64 = 26 * 7 * 24 * 60 * 60;
