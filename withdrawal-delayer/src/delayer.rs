use std::fmt;

use parking_lot::Mutex;
use rollup_types::abi::{call_succeeded, send_token_interface};
use rollup_types::{Address, Bytes, Call, Chain, Entered, NATIVE_TOKEN, ReentrancyGuard};
use rollup_types::{Timestamp, TokenCall};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{DelayerConfig, DelayerError, DelayerEvent, DepositLedger, DepositState};
use crate::{MAX_EMERGENCY_MODE_TIME, MAX_WITHDRAWAL_DELAY, Role, Roles};

/// Operating mode. Emergency mode can not be left once entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Normal,
    Emergency { since: Timestamp },
}

/// Vault holding funds withdrawn from the rollup for a delay before
/// owners can take them out.
///
/// If something goes wrong the keeper can enable emergency mode, which
/// stops all withdrawals and lets governance, and after a long wait the
/// white hack group, move the funds to safety.
pub struct WithdrawalDelayer<C> {
    address: Address,
    chain: C,
    guard: ReentrancyGuard,
    state: Mutex<Instance>,
}

enum Instance {
    Uninitialized,
    Ready(Box<State>),
}

struct State {
    delay: u64,
    roles: Roles,
    mode: Mode,
    deposits: DepositLedger,
    events: Vec<DelayerEvent>,
}

impl<C> fmt::Debug for WithdrawalDelayer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithdrawalDelayer")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl<C: Chain> WithdrawalDelayer<C> {
    pub fn new(address: Address, chain: C) -> Self {
        Self {
            address,
            chain,
            guard: ReentrancyGuard::new(),
            state: Mutex::new(Instance::Uninitialized),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn initialize(&self, config: &DelayerConfig) -> Result<(), DelayerError> {
        let _e = self.enter()?;
        let mut inst = self.state.lock();
        if matches!(*inst, Instance::Ready(_)) {
            return Err(DelayerError::AlreadyInitialized);
        }
        config.validate()?;
        info!(
            delayer = %self.address,
            delay   = config.initial_withdrawal_delay,
            rollup  = %config.rollup,
            "delayer initialized"
        );
        *inst = Instance::Ready(Box::new(State {
            delay: config.initial_withdrawal_delay,
            roles: config.roles(),
            mode: Mode::Normal,
            deposits: DepositLedger::new(),
            events: Vec::new(),
        }));
        Ok(())
    }

    /// Lock `amount` of `token` for `owner`.
    ///
    /// Native currency arrives as the call's value, which must equal
    /// `amount`. Tokens are pulled from the rollup, which must have
    /// approved the delayer.
    pub fn deposit(
        &self,
        call: &Call,
        owner: Address,
        token: Address,
        amount: u128,
    ) -> Result<(), DelayerError> {
        let _e = self.enter()?;

        self.read(|s| {
            s.roles.authorize(call.sender, &[Role::Rollup])?;
            let native = token == NATIVE_TOKEN;
            if (native && call.value != amount) || (!native && call.value != 0) {
                return Err(DelayerError::InvalidNativeAmount {
                    value: call.value,
                    amount,
                });
            }
            s.deposits
                .checked_total(owner, token, amount)
                .ok_or(DelayerError::DepositOverflow)?;
            Ok(())
        })?;

        if token != NATIVE_TOKEN {
            let allowance = self.chain.allowance(token, call.sender, self.address);
            if allowance < amount {
                debug!(%token, allowance, amount, "allowance too low");
                return Err(DelayerError::InsufficientAllowance { allowance, amount });
            }
            let pull = TokenCall::TransferFrom {
                from: call.sender,
                to: self.address,
                amount,
            };
            self.token_call(token, pull)?;
        }

        self.write(|s| s.process_deposit(owner, token, amount, call.time))
    }

    /// Accept tokens pushed to the delayer by a send-style token.
    ///
    /// `call.sender` is the token. Transfers the delayer makes itself are
    /// accounted for by `deposit` and ignored here.
    pub fn tokens_received(
        &self,
        call: &Call,
        operator: Address,
        from: Address,
        amount: u128,
        owner: Address,
    ) -> Result<(), DelayerError> {
        if operator == self.address {
            return Ok(());
        }
        let _e = self.enter()?;
        let token = call.sender;

        self.read(|s| {
            s.roles.authorize(from, &[Role::Rollup])?;
            s.deposits
                .checked_total(owner, token, amount)
                .ok_or(DelayerError::DepositOverflow)?;
            Ok(())
        })?;

        if self
            .chain
            .interface_implementer(token, send_token_interface())
            .is_none()
        {
            return Err(DelayerError::UnsupportedToken(token));
        }

        self.write(|s| s.process_deposit(owner, token, amount, call.time))
    }

    /// Pay out the deposit of `owner` in `token` once its delay passed.
    ///
    /// Anyone may trigger the withdrawal; the funds always go to `owner`.
    pub fn withdrawal(&self, call: &Call, owner: Address, token: Address) -> Result<u128, DelayerError> {
        let _e = self.enter()?;

        let deposit = self.write(|s| {
            if let Mode::Emergency { .. } = s.mode {
                return Err(DelayerError::EmergencyModeActive);
            }
            let d = s.deposits.get(owner, token);
            if d.is_empty() {
                return Err(DelayerError::NoFunds);
            }
            let unlock = d.deposit_timestamp.saturating_add(s.delay);
            if call.time < unlock {
                debug!(%owner, %token, %unlock, now = %call.time, "withdrawal too early");
                return Err(DelayerError::DelayNotElapsed(unlock));
            }
            Ok(s.deposits.take(owner, token))
        })?;

        if let Err(e) = self.pay(token, owner, deposit.amount) {
            self.write(|s| {
                s.deposits.restore(owner, token, deposit);
                Ok(())
            })?;
            return Err(e);
        }

        self.write(|s| {
            s.emit(DelayerEvent::Withdraw {
                token,
                owner,
                amount: deposit.amount,
            });
            Ok(())
        })?;

        info!(%owner, %token, amount = deposit.amount, "withdrawal");
        Ok(deposit.amount)
    }

    /// Move the delayer's whole balance of `token` to `to`.
    ///
    /// Only in emergency mode. Governance may do so at once, the white
    /// hack group after the emergency window expired.
    pub fn escape_hatch_withdrawal(
        &self,
        call: &Call,
        to: Address,
        token: Address,
    ) -> Result<u128, DelayerError> {
        let _e = self.enter()?;

        self.read(|s| {
            let Mode::Emergency { since } = s.mode else {
                return Err(DelayerError::EmergencyModeNotActive);
            };
            let role = s
                .roles
                .authorize(call.sender, &[Role::Governance, Role::WhiteHackGroup])?;
            if role == Role::WhiteHackGroup {
                let open = since.saturating_add(MAX_EMERGENCY_MODE_TIME);
                if call.time < open {
                    return Err(DelayerError::EmergencyWindowNotExpired(open));
                }
            }
            Ok(())
        })?;

        let amount = self.chain.balance_of(token, self.address);
        if amount == 0 {
            return Err(DelayerError::NoFunds);
        }
        self.pay(token, to, amount)?;

        self.write(|s| {
            s.emit(DelayerEvent::EscapeHatchWithdrawal {
                who: call.sender,
                to,
                token,
                amount,
            });
            Ok(())
        })?;

        warn!(who = %call.sender, %to, %token, amount, "escape hatch withdrawal");
        Ok(amount)
    }

    /// Set the delay of all deposits, including those already made.
    pub fn change_withdrawal_delay(&self, call: &Call, delay: u64) -> Result<(), DelayerError> {
        let _e = self.enter()?;
        self.write(|s| {
            s.roles
                .authorize(call.sender, &[Role::Keeper, Role::Rollup])?;
            if delay > MAX_WITHDRAWAL_DELAY {
                return Err(DelayerError::DelayTooLong(delay));
            }
            s.delay = delay;
            s.emit(DelayerEvent::NewWithdrawalDelay(delay));
            info!(delay, by = %call.sender, "withdrawal delay changed");
            Ok(())
        })
    }

    pub fn enable_emergency_mode(&self, call: &Call) -> Result<(), DelayerError> {
        let _e = self.enter()?;
        self.write(|s| {
            s.roles.authorize(call.sender, &[Role::Keeper])?;
            if let Mode::Emergency { .. } = s.mode {
                return Err(DelayerError::AlreadyEnabled);
            }
            s.mode = Mode::Emergency { since: call.time };
            s.emit(DelayerEvent::EmergencyModeEnabled);
            warn!(since = %call.time, "emergency mode enabled");
            Ok(())
        })
    }

    pub fn set_keeper(&self, call: &Call, to: Address) -> Result<(), DelayerError> {
        self.transfer_role(call, Role::Keeper, to, DelayerEvent::NewKeeperAddress(to))
    }

    pub fn set_white_hack_group(&self, call: &Call, to: Address) -> Result<(), DelayerError> {
        let e = DelayerEvent::NewWhiteHackGroupAddress(to);
        self.transfer_role(call, Role::WhiteHackGroup, to, e)
    }

    pub fn set_governance(&self, call: &Call, to: Address) -> Result<(), DelayerError> {
        self.transfer_role(call, Role::Governance, to, DelayerEvent::NewGovernanceAddress(to))
    }

    pub fn deposit_info(&self, owner: Address, token: Address) -> Result<DepositState, DelayerError> {
        self.read(|s| Ok(s.deposits.get(owner, token)))
    }

    pub fn withdrawal_delay(&self) -> Result<u64, DelayerError> {
        self.read(|s| Ok(s.delay))
    }

    pub fn mode(&self) -> Result<Mode, DelayerError> {
        self.read(|s| Ok(s.mode))
    }

    pub fn is_emergency_mode(&self) -> Result<bool, DelayerError> {
        self.read(|s| Ok(matches!(s.mode, Mode::Emergency { .. })))
    }

    pub fn emergency_mode_starting_time(&self) -> Result<Option<Timestamp>, DelayerError> {
        self.read(|s| match s.mode {
            Mode::Normal => Ok(None),
            Mode::Emergency { since } => Ok(Some(since)),
        })
    }

    pub fn role_holder(&self, r: Role) -> Result<Address, DelayerError> {
        self.read(|s| Ok(s.roles.holder(r)))
    }

    pub fn roles(&self) -> Result<Roles, DelayerError> {
        self.read(|s| Ok(s.roles))
    }

    /// Events emitted so far.
    pub fn events(&self) -> Vec<DelayerEvent> {
        match &*self.state.lock() {
            Instance::Ready(s) => s.events.clone(),
            Instance::Uninitialized => Vec::new(),
        }
    }

    /// Remove and return the events emitted so far.
    pub fn drain_events(&self) -> Vec<DelayerEvent> {
        match &mut *self.state.lock() {
            Instance::Ready(s) => std::mem::take(&mut s.events),
            Instance::Uninitialized => Vec::new(),
        }
    }

    fn enter(&self) -> Result<Entered<'_>, DelayerError> {
        self.guard.enter().ok_or(DelayerError::Reentrancy)
    }

    fn read<F, R>(&self, f: F) -> Result<R, DelayerError>
    where
        F: FnOnce(&State) -> Result<R, DelayerError>,
    {
        match &*self.state.lock() {
            Instance::Ready(s) => f(s),
            Instance::Uninitialized => Err(DelayerError::NotInitialized),
        }
    }

    fn write<F, R>(&self, f: F) -> Result<R, DelayerError>
    where
        F: FnOnce(&mut State) -> Result<R, DelayerError>,
    {
        match &mut *self.state.lock() {
            Instance::Ready(s) => f(s),
            Instance::Uninitialized => Err(DelayerError::NotInitialized),
        }
    }

    fn transfer_role(
        &self,
        call: &Call,
        role: Role,
        to: Address,
        event: DelayerEvent,
    ) -> Result<(), DelayerError> {
        let _e = self.enter()?;
        self.write(|s| {
            s.roles.transfer(call.sender, role, to)?;
            s.emit(event);
            info!(%role, from = %call.sender, %to, "role transferred");
            Ok(())
        })
    }

    fn token_call(&self, token: Address, call: TokenCall) -> Result<(), DelayerError> {
        let result = self.chain.call(token, self.address, call.clone());
        if call_succeeded(&result) {
            return Ok(());
        }
        warn!(delayer = %self.address, %token, ?call, "token call failed");
        Err(DelayerError::TokenTransferFailed)
    }

    /// Move `amount` of `token` from the delayer to `to`.
    ///
    /// Send-style tokens registered in the interface registry are sent,
    /// all others transferred.
    fn pay(&self, token: Address, to: Address, amount: u128) -> Result<(), DelayerError> {
        if token == NATIVE_TOKEN {
            return self
                .chain
                .send_native(self.address, to, amount)
                .map_err(|_| {
                    warn!(delayer = %self.address, %to, amount, "native transfer failed");
                    DelayerError::NativeTransferFailed
                });
        }
        let send_style = self
            .chain
            .interface_implementer(token, send_token_interface())
            .is_some();
        let call = if send_style {
            TokenCall::Send {
                to,
                amount,
                data: Bytes::new(),
            }
        } else {
            TokenCall::Transfer { to, amount }
        };
        self.token_call(token, call)
    }
}

impl State {
    fn emit(&mut self, e: DelayerEvent) {
        self.events.push(e)
    }

    fn process_deposit(
        &mut self,
        owner: Address,
        token: Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), DelayerError> {
        let total = self
            .deposits
            .add(owner, token, amount, now)
            .ok_or(DelayerError::DepositOverflow)?;
        self.emit(DelayerEvent::Deposit {
            owner,
            token,
            amount: total,
            timestamp: now,
        });
        info!(%owner, %token, amount, total, "deposit");
        Ok(())
    }
}
