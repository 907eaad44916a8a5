use std::fmt;

use rollup_types::Address;
use serde::{Deserialize, Serialize};

use crate::DelayerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Sole depositor.
    Rollup,
    /// Tunes the delay and may enable emergency mode.
    Keeper,
    /// May sweep funds as soon as emergency mode is on.
    Governance,
    /// May sweep funds once emergency mode has lasted long enough.
    WhiteHackGroup,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rollup => f.write_str("rollup"),
            Self::Keeper => f.write_str("keeper"),
            Self::Governance => f.write_str("governance"),
            Self::WhiteHackGroup => f.write_str("white-hack-group"),
        }
    }
}

/// Holders of the delayer roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Roles {
    pub rollup: Address,
    pub keeper: Address,
    pub governance: Address,
    pub white_hack_group: Address,
}

impl Roles {
    pub fn holder(&self, r: Role) -> Address {
        match r {
            Role::Rollup => self.rollup,
            Role::Keeper => self.keeper,
            Role::Governance => self.governance,
            Role::WhiteHackGroup => self.white_hack_group,
        }
    }

    fn holder_mut(&mut self, r: Role) -> &mut Address {
        match r {
            Role::Rollup => &mut self.rollup,
            Role::Keeper => &mut self.keeper,
            Role::Governance => &mut self.governance,
            Role::WhiteHackGroup => &mut self.white_hack_group,
        }
    }

    /// The first of `roles` held by `sender`.
    pub fn authorize(&self, sender: Address, roles: &[Role]) -> Result<Role, DelayerError> {
        roles
            .iter()
            .copied()
            .find(|r| self.holder(*r) == sender)
            .ok_or(DelayerError::NotAuthorized(sender))
    }

    /// Hand `role` from its current holder `sender` to `to`.
    pub fn transfer(&mut self, sender: Address, role: Role, to: Address) -> Result<(), DelayerError> {
        self.authorize(sender, &[role])?;
        *self.holder_mut(role) = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rollup_types::Address;

    use super::{Role, Roles};
    use crate::DelayerError;

    fn roles() -> Roles {
        Roles {
            rollup: Address::repeat_byte(1),
            keeper: Address::repeat_byte(2),
            governance: Address::repeat_byte(3),
            white_hack_group: Address::repeat_byte(4),
        }
    }

    #[test]
    fn authorize_picks_first_held_role() {
        let mut r = roles();
        r.governance = r.keeper;
        let k = r.keeper;
        assert_eq!(r.authorize(k, &[Role::Keeper, Role::Governance]), Ok(Role::Keeper));
        assert_eq!(r.authorize(k, &[Role::Governance]), Ok(Role::Governance));
        assert_eq!(
            r.authorize(r.rollup, &[Role::Keeper]),
            Err(DelayerError::NotAuthorized(r.rollup))
        );
    }

    #[test]
    fn only_holder_transfers() {
        let mut r = roles();
        let new = Address::repeat_byte(9);
        assert_eq!(
            r.transfer(r.governance, Role::Keeper, new),
            Err(DelayerError::NotAuthorized(r.governance))
        );
        r.transfer(r.keeper, Role::Keeper, new).unwrap();
        assert_eq!(r.holder(Role::Keeper), new);
        assert_eq!(r.governance, Address::repeat_byte(3));
    }
}
