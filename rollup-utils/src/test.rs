//! An in-memory [`Chain`] for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use rollup_types::abi::{encode_bool, send_token_interface};
use rollup_types::{Address, B256, Bytes, Chain, NATIVE_TOKEN, TokenCall};
use tracing::trace;

/// How a token misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Every state-changing call reverts.
    Revert,
    /// Every state-changing call returns `false` without moving funds.
    ReturnFalse,
}

/// Callback invoked after a successful token call or native transfer,
/// with the lock on the chain state released.
pub type Hook = Arc<dyn Fn(Address, Address, &TokenCall) + Send + Sync>;

/// Balances, allowances and an interface registry kept in memory.
#[derive(Default)]
pub struct TestChain {
    state: Mutex<State>,
    hook: Mutex<Option<Hook>>,
}

#[derive(Default)]
struct State {
    /// (token, owner) -> balance
    balances: HashMap<(Address, Address), u128>,
    /// (token, owner, spender) -> allowance
    allowances: HashMap<(Address, Address, Address), u128>,
    /// (account, interface) -> implementer
    implementers: HashMap<(Address, B256), Address>,
    /// token -> failure mode
    failures: HashMap<Address, Failure>,
    /// (token, recipient) pairs whose transfers revert
    blocked: HashSet<(Address, Address)>,
    /// token -> total amount burned
    burned: HashMap<Address, u128>,
    /// Every successful call, in order.
    calls: Vec<(Address, Address, TokenCall)>,
}

impl std::fmt::Debug for TestChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestChain").finish_non_exhaustive()
    }
}

impl TestChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Credit `amount` of `token` to `owner` out of thin air.
    pub fn mint(&self, token: Address, owner: Address, amount: u128) {
        let mut s = self.state.lock();
        let b = s.balances.entry((token, owner)).or_default();
        *b = b.checked_add(amount).expect("test balances fit in u128");
    }

    pub fn approve(&self, token: Address, owner: Address, spender: Address, amount: u128) {
        self.state
            .lock()
            .allowances
            .insert((token, owner, spender), amount);
    }

    /// Register `token` as a send-style token in the interface registry.
    pub fn register_send_token(&self, token: Address) {
        self.state
            .lock()
            .implementers
            .insert((token, send_token_interface()), token);
    }

    /// Make every state-changing call of `token` fail.
    pub fn fail(&self, token: Address, f: Failure) {
        self.state.lock().failures.insert(token, f);
    }

    pub fn heal(&self, token: Address) {
        let mut s = self.state.lock();
        s.failures.remove(&token);
        s.blocked.retain(|(t, _)| *t != token);
    }

    /// Make every transfer of `token` to `to` revert.
    pub fn block(&self, token: Address, to: Address) {
        self.state.lock().blocked.insert((token, to));
    }

    pub fn on_call(&self, h: Hook) {
        *self.hook.lock() = Some(h)
    }

    pub fn balance(&self, token: Address, owner: Address) -> u128 {
        self.state
            .lock()
            .balances
            .get(&(token, owner))
            .copied()
            .unwrap_or(0)
    }

    pub fn burned(&self, token: Address) -> u128 {
        self.state.lock().burned.get(&token).copied().unwrap_or(0)
    }

    /// Successful calls made so far as (token, caller, call).
    pub fn calls(&self) -> Vec<(Address, Address, TokenCall)> {
        self.state.lock().calls.clone()
    }

    fn run_hook(&self, token: Address, caller: Address, call: &TokenCall) {
        let hook = self.hook.lock().clone();
        if let Some(h) = hook {
            h(token, caller, call)
        }
    }
}

impl State {
    fn debit(&mut self, token: Address, owner: Address, amount: u128) -> Result<(), Bytes> {
        let b = self.balances.entry((token, owner)).or_default();
        *b = b
            .checked_sub(amount)
            .ok_or_else(|| Bytes::from_static(b"insufficient balance"))?;
        Ok(())
    }

    fn credit(&mut self, token: Address, owner: Address, amount: u128) -> Result<(), Bytes> {
        let b = self.balances.entry((token, owner)).or_default();
        *b = b
            .checked_add(amount)
            .ok_or_else(|| Bytes::from_static(b"balance overflow"))?;
        Ok(())
    }

    fn apply(&mut self, token: Address, caller: Address, call: &TokenCall) -> Result<(), Bytes> {
        if let TokenCall::Transfer { to, .. }
        | TokenCall::TransferFrom { to, .. }
        | TokenCall::Send { to, .. } = call
        {
            if self.blocked.contains(&(token, *to)) {
                return Err(Bytes::from_static(b"blocked recipient"));
            }
        }
        match call {
            TokenCall::Transfer { to, amount } | TokenCall::Send { to, amount, .. } => {
                self.debit(token, caller, *amount)?;
                self.credit(token, *to, *amount)
            }
            TokenCall::TransferFrom { from, to, amount } => {
                let a = self.allowances.entry((token, *from, caller)).or_default();
                if *a < *amount {
                    return Err(Bytes::from_static(b"insufficient allowance"));
                }
                self.debit(token, *from, *amount)?;
                self.credit(token, *to, *amount)?;
                if let Some(a) = self.allowances.get_mut(&(token, *from, caller)) {
                    *a -= *amount
                }
                Ok(())
            }
            TokenCall::Burn { amount } => {
                self.debit(token, caller, *amount)?;
                let b = self.burned.entry(token).or_default();
                *b += *amount;
                Ok(())
            }
        }
    }
}

impl Chain for TestChain {
    fn balance_of(&self, token: Address, owner: Address) -> u128 {
        self.balance(token, owner)
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> u128 {
        self.state
            .lock()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn call(&self, token: Address, caller: Address, call: TokenCall) -> Result<Bytes, Bytes> {
        {
            let mut s = self.state.lock();
            match s.failures.get(&token) {
                Some(Failure::Revert) => {
                    trace!(%token, ?call, "token call reverts");
                    return Err(Bytes::from_static(b"revert"));
                }
                Some(Failure::ReturnFalse) => {
                    trace!(%token, ?call, "token call returns false");
                    return Ok(encode_bool(false));
                }
                None => {}
            }
            s.apply(token, caller, &call)?;
            s.calls.push((token, caller, call.clone()));
        }
        self.run_hook(token, caller, &call);
        Ok(encode_bool(true))
    }

    fn send_native(&self, from: Address, to: Address, amount: u128) -> Result<(), Bytes> {
        let call = TokenCall::Transfer { to, amount };
        {
            let mut s = self.state.lock();
            if s.failures.contains_key(&NATIVE_TOKEN) {
                return Err(Bytes::from_static(b"revert"));
            }
            s.apply(NATIVE_TOKEN, from, &call)?;
            s.calls.push((NATIVE_TOKEN, from, call.clone()));
        }
        self.run_hook(NATIVE_TOKEN, from, &call);
        Ok(())
    }

    fn interface_implementer(&self, account: Address, interface: B256) -> Option<Address> {
        self.state
            .lock()
            .implementers
            .get(&(account, interface))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use rollup_types::abi::{call_succeeded, send_token_interface};
    use rollup_types::{Address, Chain, TokenCall};

    use super::{Failure, TestChain};

    const TOKEN: Address = Address::repeat_byte(0xee);
    const ALICE: Address = Address::repeat_byte(0xa1);
    const BOB: Address = Address::repeat_byte(0xb0);

    #[test]
    fn transfer_from_spends_allowance() {
        let c = TestChain::new();
        c.mint(TOKEN, ALICE, 100);
        c.approve(TOKEN, ALICE, BOB, 60);

        let call = TokenCall::TransferFrom {
            from: ALICE,
            to: BOB,
            amount: 50,
        };
        assert!(call_succeeded(&c.call(TOKEN, BOB, call.clone())));
        assert_eq!(c.allowance(TOKEN, ALICE, BOB), 10);
        assert_eq!(c.balance(TOKEN, BOB), 50);
        assert!(!call_succeeded(&c.call(TOKEN, BOB, call)));
        assert_eq!(c.balance(TOKEN, ALICE), 50);
    }

    #[test]
    fn failure_modes() {
        let c = TestChain::new();
        c.mint(TOKEN, ALICE, 10);
        let call = TokenCall::Transfer { to: BOB, amount: 1 };

        c.fail(TOKEN, Failure::ReturnFalse);
        assert!(c.call(TOKEN, ALICE, call.clone()).is_ok());
        assert!(!call_succeeded(&c.call(TOKEN, ALICE, call.clone())));

        c.fail(TOKEN, Failure::Revert);
        assert!(c.call(TOKEN, ALICE, call.clone()).is_err());

        c.heal(TOKEN);
        assert!(call_succeeded(&c.call(TOKEN, ALICE, call.clone())));
        assert_eq!(c.balance(TOKEN, BOB), 1);

        c.block(TOKEN, BOB);
        assert!(c.call(TOKEN, ALICE, call).is_err());
        assert_eq!(c.balance(TOKEN, BOB), 1);
    }

    #[test]
    fn registry() {
        let c = TestChain::new();
        assert_eq!(c.interface_implementer(TOKEN, send_token_interface()), None);
        c.register_send_token(TOKEN);
        assert_eq!(
            c.interface_implementer(TOKEN, send_token_interface()),
            Some(TOKEN)
        );
    }
}
