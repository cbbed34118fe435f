//! Property-based tests for transfer construction

use proptest::prelude::*;
use region_core::{AccountId, ChainId, CoreMask, RegionId};
use xcm_transfer::*;

fn chain() -> impl Strategy<Value = ChainId> {
    prop_oneof![
        Just(ChainId::Relay),
        Just(ChainId::Coretime),
        Just(ChainId::Market),
    ]
}

proptest! {
    /// Every fungible transfer between distinct chains builds, and the fee index
    /// points at the transferred balance
    #[test]
    fn prop_fungible_fee_index(
        source in chain(),
        dest in chain(),
        amount in 1u128..u128::MAX,
        key in any::<[u8; 32]>(),
    ) {
        prop_assume!(source != dest);
        let builder = TransferBuilder::new(TransferConfig::default()).unwrap();
        let msg = builder
            .build_transfer(Direction::new(source, dest), TransferAsset::Fungible(amount), AccountId::new(key))
            .unwrap();

        let fee = msg.message.fee_asset().unwrap();
        prop_assert_eq!(fee.fun, Fungibility::Fungible(amount));
        prop_assert_eq!(msg.message.beneficiary.clone(), Location::account(AccountId::new(key)));
    }

    /// Region transfers carry the packed id and a relay-token fee, in either direction
    #[test]
    fn prop_region_transfer_carries_packed_id(
        begin in any::<u32>(),
        core in any::<u16>(),
        mask in 1u128..(1u128 << 80),
        to_market in any::<bool>(),
    ) {
        let id = RegionId::new(begin, core, CoreMask::from_raw(mask).unwrap()).unwrap();
        let direction = if to_market {
            Direction::new(ChainId::Coretime, ChainId::Market)
        } else {
            Direction::new(ChainId::Market, ChainId::Coretime)
        };

        let builder = TransferBuilder::new(TransferConfig::default()).unwrap();
        let msg = builder
            .build_transfer(direction, TransferAsset::Region(id), AccountId::new([1u8; 32]))
            .unwrap();

        let assets = msg.message.assets.as_slice();
        prop_assert_eq!(assets.len(), 2);
        prop_assert!(assets.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(assets.iter().any(|a| a.fun == Fungibility::NonFungible(AssetInstance::Index(id.encode()))));
        prop_assert!(matches!(msg.message.fee_asset().unwrap().fun, Fungibility::Fungible(_)));
    }
}
