//! Departure board polling daemon.
//!
//! Fetches the staff departure feed for one station on a fixed
//! interval, keeps the shared [`DepartureBoard`] cache current and logs
//! the upcoming departures. Configuration comes from the environment:
//!
//! * `STAFF_API_KEY` - key for the departure board feed (required)
//! * `REASON_CODE_API_KEY` - key for the reason-code feed (required)
//! * `BOARD_LOCATION` - CRS code of the station (required, e.g. `SPT`)
//! * `BOARD_REFRESH_SECS` - polling interval, default 60
//! * `BOARD_PLATFORM` - restrict the selection to one platform

use std::time::Duration;

use tracing::{error, info, warn};

use board_server::board::{BoardConfig, DepartureBoard, ServiceIndex};
use board_server::feed::{FeedClient, FeedConfig};

fn required_env(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    std::env::var(name).map_err(|_| format!("environment variable {name} is required").into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let board_key = required_env("STAFF_API_KEY")?;
    let reason_key = required_env("REASON_CODE_API_KEY")?;
    let location = required_env("BOARD_LOCATION")?;
    let refresh_secs: u64 = match std::env::var("BOARD_REFRESH_SECS") {
        Ok(raw) => raw.parse()?,
        Err(_) => 60,
    };

    let client = FeedClient::new(FeedConfig::new(board_key, reason_key))?;
    let board = DepartureBoard::new(BoardConfig::default());

    if let Ok(platform) = std::env::var("BOARD_PLATFORM") {
        info!(%platform, "restricting departures to one platform");
        board.set_platform(platform);
    }

    info!(%location, refresh_secs, "fetching initial snapshot");
    let reasons = client.fetch_reason_codes().await?;
    let snapshot = client.fetch_departures(&location).await?;
    board.create_from_json(&snapshot.body, &reasons, snapshot.version)?;
    info!(
        station = %board.location_name(),
        services = board.service_count(),
        "board initialised"
    );
    log_departures(&board)?;

    let mut interval = tokio::time::interval(Duration::from_secs(refresh_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; the initial snapshot covers it.
    interval.tick().await;

    loop {
        interval.tick().await;

        let snapshot = match client.fetch_departures(&location).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                // The previous snapshot stays published; try again next tick.
                warn!(%err, "feed fetch failed, keeping previous snapshot");
                continue;
            }
        };

        if let Err(err) = board.update(&snapshot.body, snapshot.version) {
            error!(%err, version = snapshot.version, "snapshot rejected");
            continue;
        }

        log_departures(&board)?;
    }
}

fn log_departures(board: &DepartureBoard) -> Result<(), Box<dyn std::error::Error>> {
    let messages = board.nrcc_messages();
    if !messages.is_empty() {
        info!(%messages, "network messages");
    }

    for ordinal in 1..=board.num_departures() {
        let index = board.ordinal_departure(ordinal)?;
        if index == ServiceIndex::NONE {
            continue;
        }
        let basic = board.basic_info(index)?;
        info!(
            ordinal,
            scheduled = %basic.scheduled_departure,
            estimated = %basic.estimated_departure,
            destination = %basic.destination,
            platform = %board.platform(index),
            "departure"
        );
    }
    Ok(())
}
