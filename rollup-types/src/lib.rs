mod block;
mod call;
mod chain;
mod error;
mod guard;
mod time;

pub mod abi;

pub use alloy_primitives::{Address, B256, Bytes};
pub use block::{BlockNumber, SlotNumber};
pub use call::Call;
pub use chain::{Chain, NATIVE_TOKEN, TokenCall};
pub use error::ErrorKind;
pub use guard::{Entered, ReentrancyGuard};
pub use time::Timestamp;

/// Denominator of all ratios expressed in basis points.
pub const BASIS_POINTS: u128 = 10_000;
