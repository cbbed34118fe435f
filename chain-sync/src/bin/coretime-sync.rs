//! Scripted region lifecycle against the in-memory chains
//!
//! Buys a region in the bulk sale, moves it to the market chain, retrieves its record there
//! and prints the resulting metadata.

use anyhow::{Context, Result};
use chain_sync::{
    spawn_retrieval_poller, ChainAdapter, Config, InMemoryAdapter, RecordRetriever,
    RetrievalEvent, SaleTracker, Signer, TransferCoordinator,
};
use region_core::store::{InMemoryStore, RegionLabels};
use region_core::{
    region_metadata, AccountId, ChainContext, ChainId, CoreMask, Region, RegionId,
    RegionLocation, RegionRecord, RenewalQuote,
};
use rust_decimal::Decimal;
use sale_engine::{SaleConfig, SaleInfo};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use xcm_transfer::{Direction, TransferBuilder};

const RELAY_BLOCK: u32 = 8_000;
const CORETIME_BLOCK: u32 = 4_100;
const GENESIS_MS: u64 = 1_700_000_000_000;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).with_context(|| format!("loading {}", path))?,
        None => Config::from_env().context("loading configuration from environment")?,
    };
    tracing::info!("Starting {}", config.service_name);

    let adapter = Arc::new(InMemoryAdapter::new(&config.transfer));
    adapter.set_head(ChainId::Relay, RELAY_BLOCK, GENESIS_MS);
    adapter.set_head(ChainId::Coretime, CORETIME_BLOCK, GENESIS_MS);
    adapter.set_head(ChainId::Market, 1_000, GENESIS_MS);

    let alice = AccountId::new([0xa1; 32]);
    let bob = AccountId::new([0xb0; 32]);
    let signer = Signer::new(alice);

    // Bulk sale
    let sale_info = SaleInfo {
        sale_start: 4_000,
        leadin_length: 200,
        floor_price: 50_000_000_000,
        region_begin: 100,
        region_end: 120,
        first_core: 10,
        ideal_cores_sold: 3,
        cores_offered: 5,
        cores_sold: 0,
        sellout_price: None,
        previous_sellout_price: Some(80_000_000_000),
    };
    let sale_config = SaleConfig {
        interlude_length: 50,
        leadin_length: 200,
        region_length: 20,
        renewal_bump: Decimal::new(3, 2),
    };
    adapter.set_sale(sale_info.clone(), sale_config);

    let mut tracker =
        SaleTracker::new(adapter.clone(), &config.sale).context("building the sale tracker")?;
    let mut sale = tracker.refresh().await.context("reading the sale")?;

    tracing::info!(
        "Sale phase at block {}: {}",
        CORETIME_BLOCK,
        sale.phase(CORETIME_BLOCK)
    );
    tracing::info!("Current price: {:?}", tracker.current_price().await?);
    let price = sale
        .record_purchase(tracker.engine(), CORETIME_BLOCK)
        .context("buying a core")?;
    tracing::info!("Bought core {} for {}", sale_info.first_core, price);

    adapter.set_renewal_quote(
        sale_info.first_core,
        RenewalQuote {
            price,
            mask: CoreMask::complete(),
            task: config.transfer.chains.market_para_id,
        },
    );
    tracing::info!(
        "Renewing core {} after one missed cycle would cost {}",
        sale_info.first_core,
        tracker.renewal_price(sale_info.first_core, 1).await?
    );

    let region_id = RegionId::new(
        sale_info.region_begin,
        sale_info.first_core,
        CoreMask::complete(),
    )?;
    let record = RegionRecord {
        end: sale_info.region_end,
        owner: alice,
        paid: Some(price),
    };
    adapter.insert_region(ChainId::Coretime, region_id, record);

    let labels = RegionLabels::new(InMemoryStore::new());
    labels.save(&region_id, "demo-region")?;

    // Move to the market chain; the destination lags two queries behind
    adapter.delay_visibility(ChainId::Market, region_id, 2);
    let coordinator = TransferCoordinator::new(
        adapter.clone(),
        TransferBuilder::new(config.transfer.clone())?,
        config.polling.clone(),
    );
    let receipt = coordinator
        .transfer_region(
            Direction::new(ChainId::Coretime, ChainId::Market),
            region_id,
            bob,
            &signer,
        )
        .await
        .context("transferring region to the market chain")?;
    tracing::info!(
        "Region {} arrived on the market chain after {} checks",
        region_id,
        receipt.attempts
    );

    // Fetch its record through the market chain
    let retriever = RecordRetriever::new(adapter.clone(), Signer::new(bob));
    let mut retrieval = retriever.retrieve_record(region_id, None)?;
    retrieval.request().await.context("requesting region record")?;

    let cancel = CancellationToken::new();
    let (task, mut events) =
        spawn_retrieval_poller(vec![retrieval], config.polling.interval(), cancel.clone())?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping poller");
                cancel.cancel();
                break;
            }
            event = events.recv() => match event {
                Some(RetrievalEvent::RecordAvailable { region, record }) => {
                    tracing::info!("Record of region {} available (ends at {})", region, record.end);
                }
                Some(RetrievalEvent::StatusChanged { region, from, to }) => {
                    tracing::info!("Region {} record {:?} -> {:?}", region, from, to);
                }
                Some(RetrievalEvent::Failed { region, kind, message }) => {
                    tracing::warn!("Region {} retrieval failed ({}): {}", region, kind, message);
                }
                None => break,
            }
        }
    }

    let handles = task.await.context("poller task panicked")?;

    for handle in &handles {
        let held = adapter
            .region_record(ChainId::Market, &handle.region())
            .await?
            .context("region record not delivered to the market chain")?;
        let region = Region::from_parts(handle.region(), held)?;
        let metadata = region_metadata(
            &region,
            &ChainContext {
                location: RegionLocation::MarketChain,
                relay_block: RELAY_BLOCK,
                timeslice_period: config.timing.timeslice_period,
                task_id: None,
                record_status: handle.status(),
                request_commitment: handle.commitment(),
            },
        );
        let name = labels.load(&handle.region())?.unwrap_or_default();
        println!("{} {}", name, serde_json::to_string_pretty(&metadata)?);
    }

    Ok(())
}
