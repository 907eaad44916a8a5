use alloy_primitives::Address;

use crate::{BlockNumber, Timestamp};

/// The context an operation executes in.
///
/// Every state-changing operation receives the identity of its caller
/// together with the block and time the host executes it at, so that
/// authorisation and time-based rules never consult ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    /// The account invoking the operation.
    pub sender: Address,
    /// Native currency attached to the call, already credited to the callee.
    pub value: u128,
    /// Height of the block the call is included in.
    pub block: BlockNumber,
    /// Timestamp of the block the call is included in.
    pub time: Timestamp,
}

impl Call {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            value: 0,
            block: BlockNumber::default(),
            time: Timestamp::default(),
        }
    }

    pub fn with_value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }

    pub fn at_block<B: Into<BlockNumber>>(mut self, b: B) -> Self {
        self.block = b.into();
        self
    }

    pub fn at_time<T: Into<Timestamp>>(mut self, t: T) -> Self {
        self.time = t.into();
        self
    }
}
