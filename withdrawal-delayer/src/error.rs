use rollup_types::{Address, ErrorKind, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DelayerError {
    #[error("delayer is not initialized")]
    NotInitialized,

    #[error("delayer is already initialized")]
    AlreadyInitialized,

    #[error("{0} is not authorized")]
    NotAuthorized(Address),

    #[error("withdrawal delay {0}s exceeds the maximum")]
    DelayTooLong(u64),

    #[error("native value {value} does not match the deposit amount {amount}")]
    InvalidNativeAmount { value: u128, amount: u128 },

    #[error("allowance {allowance} is below the deposit amount {amount}")]
    InsufficientAllowance { allowance: u128, amount: u128 },

    #[error("deposit amount overflows")]
    DepositOverflow,

    #[error("emergency mode is active")]
    EmergencyModeActive,

    #[error("emergency mode is not active")]
    EmergencyModeNotActive,

    #[error("no funds to withdraw")]
    NoFunds,

    #[error("withdrawal is not allowed before {0}")]
    DelayNotElapsed(Timestamp),

    #[error("emergency mode is already enabled")]
    AlreadyEnabled,

    #[error("emergency window lasts until {0}")]
    EmergencyWindowNotExpired(Timestamp),

    #[error("token transfer failed")]
    TokenTransferFailed,

    #[error("native transfer failed")]
    NativeTransferFailed,

    #[error("{0} is not a send-style token")]
    UnsupportedToken(Address),

    #[error("reentrant call")]
    Reentrancy,
}

impl DelayerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DelayTooLong(_)
            | Self::InvalidNativeAmount { .. }
            | Self::InsufficientAllowance { .. }
            | Self::UnsupportedToken(_) => ErrorKind::PreconditionViolation,

            Self::NotAuthorized(_) => ErrorKind::AuthorizationFailure,

            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::EmergencyModeActive
            | Self::EmergencyModeNotActive
            | Self::NoFunds
            | Self::DelayNotElapsed(_)
            | Self::AlreadyEnabled
            | Self::EmergencyWindowNotExpired(_)
            | Self::Reentrancy => ErrorKind::StateConflict,

            Self::DepositOverflow => ErrorKind::ArithmeticFailure,

            Self::TokenTransferFailed | Self::NativeTransferFailed => {
                ErrorKind::ExternalCallFailure
            }
        }
    }
}
