use std::sync::Arc;

use alloy_primitives::{Address, B256, Bytes};

/// The zero address denotes the chain's native currency.
pub const NATIVE_TOKEN: Address = Address::ZERO;

/// State-changing calls a contract makes into a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCall {
    /// Move `amount` from the caller to `to`.
    Transfer { to: Address, amount: u128 },
    /// Move `amount` from `from` to `to`, spending the caller's allowance.
    TransferFrom {
        from: Address,
        to: Address,
        amount: u128,
    },
    /// Send-style transfer of tokens with recipient hooks.
    Send {
        to: Address,
        amount: u128,
        data: Bytes,
    },
    /// Destroy `amount` of the caller's tokens.
    Burn { amount: u128 },
}

/// The platform hosting the auction and the delayer.
///
/// External calls return the callee's raw return data, or its revert data
/// when the call failed. Interpreting the return data is up to the caller.
pub trait Chain: Send + Sync {
    /// Balance of `owner` in `token` (native currency for [`NATIVE_TOKEN`]).
    fn balance_of(&self, token: Address, owner: Address) -> u128;

    /// Remaining amount `spender` may move on behalf of `owner`.
    fn allowance(&self, token: Address, owner: Address, spender: Address) -> u128;

    /// Invoke `token` with `caller` as message sender.
    fn call(&self, token: Address, caller: Address, call: TokenCall) -> Result<Bytes, Bytes>;

    /// Transfer native currency.
    fn send_native(&self, from: Address, to: Address, amount: u128) -> Result<(), Bytes>;

    /// Look up the implementer of `interface` registered for `account`.
    fn interface_implementer(&self, account: Address, interface: B256) -> Option<Address>;
}

impl<C: Chain + ?Sized> Chain for Arc<C> {
    fn balance_of(&self, token: Address, owner: Address) -> u128 {
        (**self).balance_of(token, owner)
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> u128 {
        (**self).allowance(token, owner, spender)
    }

    fn call(&self, token: Address, caller: Address, call: TokenCall) -> Result<Bytes, Bytes> {
        (**self).call(token, caller, call)
    }

    fn send_native(&self, from: Address, to: Address, amount: u128) -> Result<(), Bytes> {
        (**self).send_native(from, to, amount)
    }

    fn interface_implementer(&self, account: Address, interface: B256) -> Option<Address> {
        (**self).interface_implementer(account, interface)
    }
}
