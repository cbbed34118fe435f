//! Transfer message construction
//!
//! Pure function of the configuration and the request: nothing here inspects balances,
//! ownership or chain state. Submission and fee payment belong to the chain adapter.

use crate::{
    asset::{Asset, Assets},
    config::TransferConfig,
    direction::{route, AssetKind, Direction, TransferAsset},
    location::{Junction, Location},
    message::{TransferMessage, VersionedMessage},
    Error, Result,
};
use region_core::{AccountId, ChainId};
use tracing::debug;

/// Builds transfer messages for the configured chains
#[derive(Debug, Clone)]
pub struct TransferBuilder {
    config: TransferConfig,
}

impl TransferBuilder {
    /// Create a builder; the configuration is validated
    pub fn new(config: TransferConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Build the message moving `asset` along `direction` to `beneficiary`
    pub fn build_transfer(
        &self,
        direction: Direction,
        asset: TransferAsset,
        beneficiary: AccountId,
    ) -> Result<VersionedMessage> {
        let kind = asset.kind();
        let method = route(direction, kind)?;
        let dest = self.destination(direction, kind)?;
        let fee_location = self.relay_token(direction.source);

        let (assets, fee) = match asset {
            TransferAsset::Fungible(0) => return Err(Error::ZeroAmount(direction)),
            TransferAsset::Fungible(amount) => {
                let fee = Asset::fungible(fee_location, amount);
                (Assets::new(vec![fee.clone()]), fee)
            }
            TransferAsset::Region(id) => {
                let region = Asset::non_fungible(self.region_location(direction)?, id.encode());
                let fee = Asset::fungible(fee_location, self.config.execution.region_transfer_fee);
                (Assets::new(vec![region, fee.clone()]), fee)
            }
        };

        let fee_asset_item = assets.index_of(&fee).ok_or_else(|| {
            Error::InvalidLocation(format!("fee asset {:?} missing from asset list", fee.id))
        })?;

        let message = TransferMessage {
            direction,
            asset_kind: kind,
            method,
            dest,
            beneficiary: Location::account(beneficiary),
            assets,
            fee_asset_item,
            weight_limit: self.config.weight_limit(),
        };

        debug!(
            "Built {} transfer {} via {} (fee asset {})",
            kind,
            direction,
            message.call_name(),
            fee_asset_item
        );

        Ok(VersionedMessage {
            version: self.config.xcm_version,
            message,
        })
    }

    /// Destination chain as seen from the source
    pub fn destination(&self, direction: Direction, kind: AssetKind) -> Result<Location> {
        use ChainId::*;

        let coretime = self.config.chains.coretime_para_id;
        let market = self.config.chains.market_para_id;

        match (direction.source, direction.dest) {
            (Relay, Coretime) => Ok(Location::child(coretime)),
            (Relay, Market) => Ok(Location::child(market)),
            (Coretime | Market, Relay) => Ok(Location::relay_from_parachain()),
            (Coretime, Market) => Ok(Location::sibling(market)),
            (Market, Coretime) => Ok(Location::sibling(coretime)),
            (Relay, Relay) | (Coretime, Coretime) | (Market, Market) => {
                Err(Error::UnsupportedDirection { direction, kind })
            }
        }
    }

    /// The relay-native token as seen from `source`
    fn relay_token(&self, source: ChainId) -> Location {
        match source {
            ChainId::Relay => Location::here(),
            ChainId::Coretime | ChainId::Market => Location::relay_from_parachain(),
        }
    }

    /// The broker pallet's region collection as seen from the source
    fn region_location(&self, direction: Direction) -> Result<Location> {
        let pallet = Junction::PalletInstance(self.config.chains.broker_pallet_index);

        match direction.source {
            ChainId::Coretime => Location::new(0, vec![pallet]),
            ChainId::Market => Location::new(
                1,
                vec![Junction::Parachain(self.config.chains.coretime_para_id), pallet],
            ),
            ChainId::Relay => Err(Error::UnsupportedDirection {
                direction,
                kind: AssetKind::Region,
            }),
        }
    }
}
