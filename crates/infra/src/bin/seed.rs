//! Load the demo warehouse, run one inbound and one outbound call, and print
//! the resulting views as JSON.

use anyhow::Context;
use chrono::{Duration, Utc};
use tracing::info;

use stockledger_core::UserId;
use stockledger_infra::{LedgerConfig, Warehouse};
use stockledger_inventory::{InboundEntry, OutboundEntry};

fn main() -> anyhow::Result<()> {
    stockledger_observability::init();

    let mut config = LedgerConfig::from_env().context("loading ledger configuration")?;
    config.seed_demo = true;
    let warehouse = Warehouse::in_memory(config).context("building warehouse")?;

    let feed = warehouse.subscribe_channel();
    let operator = UserId::new("operator");

    let received = warehouse
        .receive(&[InboundEntry::new("SKU-003", 24, Utc::now() + Duration::days(20))], &operator)
        .context("receiving demo stock")?;
    let shipped = warehouse
        .ship(&[OutboundEntry::new("SKU-003", 10)], &operator)
        .context("shipping demo stock")?;
    info!(received = received.len(), shipped = shipped.len(), notifications = feed.drain().len(), "demo movements applied");

    println!("{}", serde_json::to_string_pretty(&warehouse.stock_by_item()?)?);
    println!("{}", serde_json::to_string_pretty(&warehouse.aisle_occupancy()?)?);
    println!("{}", serde_json::to_string_pretty(&warehouse.dashboard()?)?);
    println!("{}", serde_json::to_string_pretty(&warehouse.recent_audit(None)?)?);

    Ok(())
}
