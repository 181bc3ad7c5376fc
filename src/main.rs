//! Gym Ledger command-line entry point.
//!
//! Reads a client snapshot (JSON) and prints the client's billing position
//! as of now.
//!
//! ```text
//! gym-ledger snapshot.json
//! ```

use std::io;
use std::sync::Arc;

use gym_ledger::adapters::{InMemoryBillingStore, SystemClock};
use gym_ledger::application::{GetClientPositionHandler, GetClientPositionQuery};
use gym_ledger::config::AppConfig;
use gym_ledger::domain::foundation::Timestamp;
use gym_ledger::domain::membership::MembershipStatus;
use gym_ledger::observability::init_logging;
use gym_ledger::ports::ClientSnapshot;

#[tokio::main]
async fn main() -> io::Result<()> {
    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        io::Error::other(format!("Configuration error: {}", e))
    })?;
    config
        .validate()
        .map_err(|e| io::Error::other(format!("Invalid configuration: {}", e)))?;

    init_logging(&config.logging)
        .map_err(|e| io::Error::other(format!("Failed to initialize logging: {}", e)))?;

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: gym-ledger <client-snapshot.json>");
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "missing snapshot path"));
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), path = %path, "Reading client snapshot");

    let raw = tokio::fs::read_to_string(&path).await?;
    let mut snapshot: ClientSnapshot = serde_json::from_str(&raw)?;

    // Stored statuses may be stale; derive them from the end dates.
    let offset = config.billing.offset().map_err(io::Error::other)?;
    let today = Timestamp::now().local_date(offset);
    for membership in &mut snapshot.memberships {
        membership.status = MembershipStatus::derive(
            membership.end_date.local_date(offset),
            today,
            config.billing.expiry_warning_days,
        );
    }

    let client_id = snapshot.client.id;
    let engine = config
        .billing
        .aggregation_engine()
        .map_err(io::Error::other)?;
    let store = InMemoryBillingStore::from_snapshot(snapshot).map_err(io::Error::other)?;
    let handler = GetClientPositionHandler::new(
        Arc::new(store),
        Arc::new(SystemClock),
        engine,
    );

    let position = handler
        .handle(GetClientPositionQuery { client_id })
        .await
        .map_err(io::Error::other)?;

    println!("{}", serde_json::to_string_pretty(&position)?);
    Ok(())
}
