use std::path::Path;

use bon::Builder;
use rollup_types::{Address, BASIS_POINTS, BlockNumber};
use rollup_utils::{ConfigError, read_toml};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::{
    AuctionError, BLOCKS_PER_SLOT, INITIAL_MINIMAL_BIDDING, MAX_AUCTION_SLOTS, SLOT_SETS,
};

/// Share of a settled bid, in basis points, that goes to each recipient.
///
/// The governance share receives the rounding remainder, so the three
/// parts of a split always add up to the bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AllocationRatio {
    pub donation: u16,
    pub burn: u16,
    pub governance: u16,
}

impl AllocationRatio {
    pub fn is_valid(&self) -> bool {
        u128::from(self.donation) + u128::from(self.burn) + u128::from(self.governance)
            == BASIS_POINTS
    }
}

impl Default for AllocationRatio {
    fn default() -> Self {
        Self {
            donation: 4000,
            burn: 4000,
            governance: 2000,
        }
    }
}

/// Governance-tunable auction parameters.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case", default)]
pub struct AuctionConfig {
    /// Slots ahead of the current one that no longer accept bids.
    #[builder(default = 2)]
    pub closed_auction_slots: u64,

    /// Size of the bidding window following the closed slots.
    #[builder(default = 4320)]
    pub open_auction_slots: u64,

    /// Minimum raise over the current bid, in basis points.
    #[builder(default = 1000)]
    pub outbidding: u16,

    /// Blocks into a slot after which anyone may forge if the winner has not.
    #[builder(default = 20)]
    pub slot_deadline: u64,

    #[builder(default)]
    pub allocation_ratio: AllocationRatio,

    /// Price of a slot without bids, per slot set.
    #[serde_as(as = "[DisplayFromStr; 6]")]
    #[builder(default = [INITIAL_MINIMAL_BIDDING; SLOT_SETS])]
    pub default_slot_set_bid: [u128; SLOT_SETS],
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AuctionConfig {
    pub async fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        read_toml(path).await
    }

    pub fn validate(&self) -> Result<(), AuctionError> {
        check_auction_slots(self.closed_auction_slots, self.open_auction_slots)?;
        if !valid_outbidding(self.outbidding) {
            return Err(AuctionError::InvalidOutbidding(self.outbidding));
        }
        if self.slot_deadline > BLOCKS_PER_SLOT {
            return Err(AuctionError::InvalidSlotDeadline(self.slot_deadline));
        }
        if !self.allocation_ratio.is_valid() {
            return Err(AuctionError::InvalidAllocationRatio(self.allocation_ratio));
        }
        Ok(())
    }
}

pub(crate) fn check_auction_slots(closed: u64, open: u64) -> Result<(), AuctionError> {
    if open > MAX_AUCTION_SLOTS {
        return Err(AuctionError::TooManyAuctionSlots(open));
    }
    if closed >= open {
        return Err(AuctionError::InvalidAuctionSlots { closed, open });
    }
    Ok(())
}

pub(crate) fn valid_outbidding(x: u16) -> bool {
    1 < x && u128::from(x) < BASIS_POINTS
}

/// Fixed parameters an auction is initialised with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct AuctionSetup {
    /// The settlement token bids are paid in.
    pub token: Address,
    pub genesis_block: BlockNumber,
    pub governance: Address,
    /// The only account allowed to call `forge`.
    pub rollup: Address,
    pub donation_address: Address,
    pub boot_coordinator: Address,
    #[builder(into)]
    pub boot_coordinator_url: String,
}

#[cfg(test)]
mod tests {
    use super::{AllocationRatio, AuctionConfig};
    use crate::{AuctionError, INITIAL_MINIMAL_BIDDING, MAX_AUCTION_SLOTS};

    #[test]
    fn defaults_are_valid() {
        let c = AuctionConfig::default();
        assert_eq!(c.closed_auction_slots, 2);
        assert_eq!(c.open_auction_slots, 4320);
        assert_eq!(c.default_slot_set_bid[5], INITIAL_MINIMAL_BIDDING);
        c.validate().unwrap();
    }

    #[test]
    fn toml_amounts_are_strings() {
        let c: AuctionConfig = toml::from_str(
            r#"
            outbidding = 500
            default-slot-set-bid = ["1", "2", "3", "4", "5", "1000000000000000000000000"]

            [allocation-ratio]
            donation = 5000
            burn = 5000
            governance = 0
            "#,
        )
        .unwrap();
        assert_eq!(c.outbidding, 500);
        assert_eq!(c.closed_auction_slots, 2);
        assert_eq!(c.default_slot_set_bid[0], 1);
        assert_eq!(c.default_slot_set_bid[5], INITIAL_MINIMAL_BIDDING);
        c.validate().unwrap();

        let s = toml::to_string(&c).unwrap();
        assert_eq!(toml::from_str::<AuctionConfig>(&s).unwrap(), c);
    }

    #[tokio::test]
    async fn read_from_file() {
        let path = std::env::temp_dir().join(format!("auction-{}.toml", std::process::id()));
        let c = AuctionConfig::builder()
            .slot_deadline(30)
            .default_slot_set_bid([7; 6])
            .build();
        rollup_utils::write_toml(&c, &path).await.unwrap();
        assert_eq!(AuctionConfig::read(&path).await.unwrap(), c);
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[test]
    fn invalid_parameters() {
        let c = AuctionConfig::builder()
            .closed_auction_slots(2)
            .open_auction_slots(MAX_AUCTION_SLOTS + 1)
            .build();
        assert_eq!(
            c.validate(),
            Err(AuctionError::TooManyAuctionSlots(MAX_AUCTION_SLOTS + 1))
        );
        let c = AuctionConfig::builder()
            .open_auction_slots(MAX_AUCTION_SLOTS)
            .build();
        assert_eq!(c.validate(), Ok(()));

        let c = AuctionConfig::builder()
            .closed_auction_slots(10)
            .open_auction_slots(10)
            .build();
        assert!(matches!(
            c.validate(),
            Err(AuctionError::InvalidAuctionSlots { .. })
        ));

        let c = AuctionConfig::builder().outbidding(1).build();
        assert!(matches!(
            c.validate(),
            Err(AuctionError::InvalidOutbidding(1))
        ));

        let c = AuctionConfig::builder().slot_deadline(41).build();
        assert!(matches!(
            c.validate(),
            Err(AuctionError::InvalidSlotDeadline(41))
        ));

        let c = AuctionConfig::builder()
            .allocation_ratio(AllocationRatio {
                donation: 1,
                burn: 1,
                governance: 1,
            })
            .build();
        assert!(matches!(
            c.validate(),
            Err(AuctionError::InvalidAllocationRatio(_))
        ));
    }
}
