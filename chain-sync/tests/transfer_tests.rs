//! Transfers between the in-memory chains

use chain_sync::config::PollingConfig;
use chain_sync::memory::sibling_account;
use chain_sync::{ChainAdapter, Error, InMemoryAdapter, Signer, TransferCoordinator, TxStep};
use region_core::{AccountId, ChainId, CoreMask, ErrorKind, RegionId, RegionRecord};
use std::sync::Arc;
use xcm_transfer::{Direction, TransferBuilder, TransferConfig};

fn alice() -> AccountId {
    AccountId::new([1u8; 32])
}

fn bob() -> AccountId {
    AccountId::new([2u8; 32])
}

fn region() -> RegionId {
    RegionId::new(300, 7, CoreMask::complete()).unwrap()
}

fn setup(polling: PollingConfig) -> (Arc<InMemoryAdapter>, TransferCoordinator) {
    let config = TransferConfig::default();
    let adapter = Arc::new(InMemoryAdapter::new(&config));
    adapter.insert_region(
        ChainId::Coretime,
        region(),
        RegionRecord {
            end: 350,
            owner: alice(),
            paid: Some(42),
        },
    );

    let builder = TransferBuilder::new(config).unwrap();
    let coordinator = TransferCoordinator::new(adapter.clone(), builder, polling);
    (adapter, coordinator)
}

#[tokio::test(start_paused = true)]
async fn test_region_transfer_waits_for_visibility() {
    let (adapter, coordinator) = setup(PollingConfig::default());
    adapter.delay_visibility(ChainId::Market, region(), 3);

    let receipt = coordinator
        .transfer_region(
            Direction::new(ChainId::Coretime, ChainId::Market),
            region(),
            bob(),
            &Signer::new(alice()),
        )
        .await
        .unwrap();

    assert_eq!(receipt.attempts, 4);
    assert_eq!(receipt.owner, bob());
    assert_eq!(receipt.outcome.step, TxStep::Finalized);
    assert!(!coordinator.is_in_flight(&region()));

    let source = adapter
        .region_record(ChainId::Coretime, &region())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(source.owner, sibling_account(TransferConfig::default().chains.market_para_id));
}

#[tokio::test(start_paused = true)]
async fn test_region_round_trip() {
    let (adapter, coordinator) = setup(PollingConfig::default());
    let there = Direction::new(ChainId::Coretime, ChainId::Market);

    coordinator
        .transfer_region(there, region(), bob(), &Signer::new(alice()))
        .await
        .unwrap();
    let receipt = coordinator
        .transfer_region(there.reversed(), region(), alice(), &Signer::new(bob()))
        .await
        .unwrap();

    assert_eq!(receipt.owner, alice());
    assert_eq!(
        adapter.region_owner(ChainId::Market, &region()).await.unwrap(),
        None
    );
}

#[tokio::test(start_paused = true)]
async fn test_visibility_exhaustion_times_out() {
    let polling = PollingConfig {
        max_attempts: 3,
        ..PollingConfig::default()
    };
    let (adapter, coordinator) = setup(polling);
    adapter.delay_visibility(ChainId::Market, region(), 100);

    let err = coordinator
        .transfer_region(
            Direction::new(ChainId::Coretime, ChainId::Market),
            region(),
            bob(),
            &Signer::new(alice()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { attempts: 3, .. }));
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(!coordinator.is_in_flight(&region()));
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_region_transfer_rejected() {
    let (adapter, coordinator) = setup(PollingConfig::default());
    adapter.delay_visibility(ChainId::Market, region(), 2);
    let direction = Direction::new(ChainId::Coretime, ChainId::Market);
    let signer = Signer::new(alice());

    let (first, second) = tokio::join!(
        coordinator.transfer_region(direction, region(), bob(), &signer),
        coordinator.transfer_region(direction, region(), bob(), &signer),
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(Error::TransferInFlight(_))));
    assert_eq!(adapter.submissions().len(), 1);
}

#[tokio::test]
async fn test_failed_submission_releases_region() {
    let (adapter, coordinator) = setup(PollingConfig::default());
    adapter.fail_next_submission(TxStep::InBlock, "TooExpensive");

    let err = coordinator
        .transfer_region(
            Direction::new(ChainId::Coretime, ChainId::Market),
            region(),
            bob(),
            &Signer::new(alice()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RemoteFailure { step: TxStep::InBlock, .. }));
    assert!(!coordinator.is_in_flight(&region()));

    let source = adapter
        .region_record(ChainId::Coretime, &region())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(source.owner, alice());
}

#[tokio::test]
async fn test_region_through_relay_rejected() {
    let (adapter, coordinator) = setup(PollingConfig::default());

    let err = coordinator
        .transfer_region(
            Direction::new(ChainId::Coretime, ChainId::Relay),
            region(),
            bob(),
            &Signer::new(alice()),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(adapter.submissions().is_empty());
}

#[tokio::test]
async fn test_fund_transfers() {
    let (adapter, coordinator) = setup(PollingConfig::default());
    let signer = Signer::new(alice());

    for direction in Direction::all() {
        coordinator
            .transfer_funds(direction, 1_000_000_000_000, bob(), &signer)
            .await
            .unwrap();
    }

    let sources: Vec<ChainId> = adapter.submissions().into_iter().map(|(c, _)| c).collect();
    assert_eq!(sources.len(), 6);

    let err = coordinator
        .transfer_funds(Direction::new(ChainId::Market, ChainId::Market), 1, bob(), &signer)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
