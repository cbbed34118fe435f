//! Sale and renewal prices read from the in-memory coretime chain

use chain_sync::{InMemoryAdapter, SaleTracker};
use region_core::{ChainId, CoreMask, ErrorKind, RenewalQuote};
use rust_decimal::Decimal;
use sale_engine::{SaleConfig, SaleInfo};
use std::sync::Arc;

const SALE_START: u32 = 1_000;

fn info() -> SaleInfo {
    SaleInfo {
        sale_start: SALE_START,
        leadin_length: 100,
        floor_price: 1_000,
        region_begin: 50,
        region_end: 60,
        first_core: 0,
        ideal_cores_sold: 2,
        cores_offered: 4,
        cores_sold: 0,
        sellout_price: None,
        previous_sellout_price: None,
    }
}

fn sale_config(interlude_length: u32) -> SaleConfig {
    SaleConfig {
        interlude_length,
        leadin_length: 100,
        region_length: 10,
        renewal_bump: Decimal::new(5, 2),
    }
}

fn setup() -> (Arc<InMemoryAdapter>, SaleTracker) {
    let adapter = Arc::new(InMemoryAdapter::default());
    adapter.set_sale(info(), sale_config(20));
    let tracker = SaleTracker::new(adapter.clone(), &sale_engine::Config::default()).unwrap();
    (adapter, tracker)
}

#[tokio::test]
async fn test_price_follows_the_coretime_head() {
    let (adapter, mut tracker) = setup();

    adapter.set_head(ChainId::Coretime, SALE_START + 10, 0);
    assert_eq!(tracker.current_price().await.unwrap(), None);

    adapter.set_head(ChainId::Coretime, SALE_START + 20, 0);
    assert_eq!(tracker.current_price().await.unwrap(), Some(2_000));

    adapter.set_head(ChainId::Coretime, SALE_START + 70, 0);
    assert_eq!(tracker.current_price().await.unwrap(), Some(1_500));

    adapter.set_head(ChainId::Coretime, SALE_START + 200, 0);
    assert_eq!(tracker.current_price().await.unwrap(), Some(1_000));

    // One cycle, one derivation
    assert_eq!(tracker.recomputations(), 1);
}

#[tokio::test]
async fn test_configuration_change_rederives_boundaries() {
    let (adapter, mut tracker) = setup();
    adapter.set_head(ChainId::Coretime, SALE_START + 30, 0);
    assert!(tracker.current_price().await.unwrap().is_some());

    adapter.set_sale(info(), sale_config(40));
    assert_eq!(tracker.current_price().await.unwrap(), None);
    assert_eq!(tracker.recomputations(), 2);

    let sale = tracker.refresh().await.unwrap();
    assert_eq!(sale.boundaries().interlude_end, SALE_START + 40);
    assert_eq!(tracker.recomputations(), 2);
}

#[tokio::test]
async fn test_renewal_uses_quote_and_configured_bump() {
    let (adapter, tracker) = setup();
    adapter.set_renewal_quote(
        2,
        RenewalQuote {
            price: 10_000,
            mask: CoreMask::complete(),
            task: 2000,
        },
    );

    assert_eq!(tracker.renewal_price(2, 0).await.unwrap(), 10_000);
    assert_eq!(tracker.renewal_price(2, 1).await.unwrap(), 10_500);
    assert_eq!(tracker.renewal_price(2, 2).await.unwrap(), 11_025);
}

#[tokio::test]
async fn test_renewal_without_quote_is_not_found() {
    let (_adapter, tracker) = setup();

    let err = tracker.renewal_price(9, 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!err.is_retryable());
}
