use std::fmt;
use std::ops::{Add, Deref, Sub};

use serde::{Deserialize, Serialize};

/// A block height of the chain hosting the auction.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockNumber(u64);

impl BlockNumber {
    pub const fn new(val: u64) -> Self {
        Self(val)
    }

    pub fn u64(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, n: u64) -> Option<Self> {
        self.0.checked_add(n).map(Self)
    }
}

/// An auction slot, i.e. a fixed-length window of blocks.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SlotNumber(u64);

impl SlotNumber {
    pub const fn new(val: u64) -> Self {
        Self(val)
    }

    pub fn u64(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, n: u64) -> Option<Self> {
        self.0.checked_add(n).map(Self)
    }
}

macro_rules! number_impls {
    ($t:ident) => {
        impl From<u64> for $t {
            fn from(val: u64) -> Self {
                Self(val)
            }
        }

        impl From<$t> for u64 {
            fn from(val: $t) -> Self {
                val.0
            }
        }

        impl Add<u64> for $t {
            type Output = Self;

            fn add(self, rhs: u64) -> Self::Output {
                Self(self.0 + rhs)
            }
        }

        impl Sub<u64> for $t {
            type Output = Self;

            fn sub(self, rhs: u64) -> Self::Output {
                Self(self.0 - rhs)
            }
        }

        impl Deref for $t {
            type Target = u64;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

number_impls!(BlockNumber);
number_impls!(SlotNumber);
