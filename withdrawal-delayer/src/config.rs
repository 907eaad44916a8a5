use std::path::Path;

use bon::Builder;
use rollup_types::Address;
use rollup_utils::{ConfigError, read_toml};
use serde::{Deserialize, Serialize};

use crate::{DelayerError, MAX_WITHDRAWAL_DELAY, Roles};

/// Parameters a delayer is initialised with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct DelayerConfig {
    /// Seconds a deposit stays locked, at most 14 days.
    #[builder(default = 60 * 60)]
    #[serde(default = "default_delay")]
    pub initial_withdrawal_delay: u64,

    pub rollup: Address,
    pub keeper: Address,
    pub governance: Address,
    pub white_hack_group: Address,
}

fn default_delay() -> u64 {
    60 * 60
}

impl DelayerConfig {
    pub async fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        read_toml(path).await
    }

    pub fn validate(&self) -> Result<(), DelayerError> {
        if self.initial_withdrawal_delay > MAX_WITHDRAWAL_DELAY {
            return Err(DelayerError::DelayTooLong(self.initial_withdrawal_delay));
        }
        Ok(())
    }

    pub fn roles(&self) -> Roles {
        Roles {
            rollup: self.rollup,
            keeper: self.keeper,
            governance: self.governance,
            white_hack_group: self.white_hack_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use rollup_types::Address;

    use super::DelayerConfig;
    use crate::{DelayerError, MAX_WITHDRAWAL_DELAY};

    #[test]
    fn parse() {
        let c: DelayerConfig = toml::from_str(
            r#"
            rollup = "0x0101010101010101010101010101010101010101"
            keeper = "0x0202020202020202020202020202020202020202"
            governance = "0x0303030303030303030303030303030303030303"
            white-hack-group = "0x0404040404040404040404040404040404040404"
            "#,
        )
        .unwrap();
        assert_eq!(c.initial_withdrawal_delay, 3600);
        assert_eq!(c.roles().white_hack_group, Address::repeat_byte(4));
        c.validate().unwrap();
    }

    #[tokio::test]
    async fn read_from_file() {
        let path = std::env::temp_dir().join(format!("delayer-{}.toml", std::process::id()));
        tokio::fs::write(
            &path,
            r#"
            initial-withdrawal-delay = 86400
            rollup = "0x0101010101010101010101010101010101010101"
            keeper = "0x0202020202020202020202020202020202020202"
            governance = "0x0303030303030303030303030303030303030303"
            white-hack-group = "0x0404040404040404040404040404040404040404"
            "#,
        )
        .await
        .unwrap();
        let c = DelayerConfig::read(&path).await.unwrap();
        assert_eq!(c.initial_withdrawal_delay, 86400);
        assert_eq!(c.keeper, Address::repeat_byte(2));
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[test]
    fn delay_is_bounded() {
        let c = DelayerConfig::builder()
            .initial_withdrawal_delay(MAX_WITHDRAWAL_DELAY + 1)
            .rollup(Address::repeat_byte(1))
            .keeper(Address::repeat_byte(2))
            .governance(Address::repeat_byte(3))
            .white_hack_group(Address::repeat_byte(4))
            .build();
        assert_eq!(
            c.validate(),
            Err(DelayerError::DelayTooLong(MAX_WITHDRAWAL_DELAY + 1))
        );
    }
}
