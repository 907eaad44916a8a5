use std::collections::HashMap;

use rollup_types::abi::pair_key;
use rollup_types::{Address, B256, Timestamp};
use serde::{Deserialize, Serialize};

/// Funds held for an owner in one token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositState {
    pub amount: u128,
    /// Time of the most recent deposit.
    pub deposit_timestamp: Timestamp,
}

impl DepositState {
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }
}

/// Deposits keyed by `keccak256(owner ‖ token)`.
#[derive(Debug, Default)]
pub struct DepositLedger {
    deposits: HashMap<B256, DepositState>,
}

impl DepositLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner: Address, token: Address) -> DepositState {
        self.deposits
            .get(&pair_key(owner, token))
            .copied()
            .unwrap_or_default()
    }

    /// The accumulated amount after adding `amount`, if it fits.
    pub fn checked_total(&self, owner: Address, token: Address, amount: u128) -> Option<u128> {
        self.get(owner, token).amount.checked_add(amount)
    }

    /// Add `amount` and refresh the deposit time, returning the new total.
    ///
    /// Nothing changes on overflow.
    pub fn add(
        &mut self,
        owner: Address,
        token: Address,
        amount: u128,
        now: Timestamp,
    ) -> Option<u128> {
        let total = self.checked_total(owner, token, amount)?;
        self.deposits.insert(
            pair_key(owner, token),
            DepositState {
                amount: total,
                deposit_timestamp: now,
            },
        );
        Some(total)
    }

    /// Remove the deposit, leaving a zeroed entry behind.
    pub fn take(&mut self, owner: Address, token: Address) -> DepositState {
        self.deposits
            .remove(&pair_key(owner, token))
            .unwrap_or_default()
    }

    /// Put back a deposit previously taken.
    pub fn restore(&mut self, owner: Address, token: Address, d: DepositState) {
        if !d.is_empty() {
            self.deposits.insert(pair_key(owner, token), d);
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;
    use rollup_types::{Address, Timestamp};

    use super::{DepositLedger, DepositState};

    const OWNER: Address = Address::repeat_byte(1);
    const TOKEN: Address = Address::repeat_byte(2);

    quickcheck! {
        fn deposits_accumulate(a: u128, b: u128) -> bool {
            let mut l = DepositLedger::new();
            l.add(OWNER, TOKEN, a, Timestamp::from(1));
            match a.checked_add(b) {
                Some(sum) => {
                    l.add(OWNER, TOKEN, b, Timestamp::from(2)) == Some(sum)
                        && l.get(OWNER, TOKEN).deposit_timestamp == Timestamp::from(2)
                }
                None => {
                    l.add(OWNER, TOKEN, b, Timestamp::from(2)).is_none()
                        && l.get(OWNER, TOKEN) == DepositState {
                            amount: a,
                            deposit_timestamp: Timestamp::from(1),
                        }
                }
            }
        }
    }

    #[test]
    fn take_and_restore() {
        let mut l = DepositLedger::new();
        l.add(OWNER, TOKEN, 5, Timestamp::from(10));
        assert_eq!(l.get(TOKEN, OWNER), DepositState::default());

        let d = l.take(OWNER, TOKEN);
        assert_eq!(d.amount, 5);
        assert_eq!(l.get(OWNER, TOKEN), DepositState::default());

        l.restore(OWNER, TOKEN, d);
        assert_eq!(l.get(OWNER, TOKEN), d);
    }
}
