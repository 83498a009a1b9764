use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use slotdesk::config::Config;
use slotdesk::engine::{
    BookingStore, ClientRollup, Engine, InMemoryStore, PeriodRollup, SlotGrid, StaffRollup, Tally,
};
use slotdesk::model::{Booking, Role, Session, Staff};
use slotdesk::notify::NotifyHub;

/// On-disk seed for the demo store.
#[derive(Debug, Default, Deserialize)]
struct Seed {
    #[serde(default)]
    bookings: Vec<Booking>,
    #[serde(default)]
    staff: Vec<Staff>,
}

#[derive(Debug, Serialize)]
struct Report {
    date: NaiveDate,
    grid: SlotGrid,
    global: Tally,
    clients: Vec<ClientRollup>,
    staff: Option<Vec<StaffRollup>>,
    period: PeriodRollup,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    slotdesk::observability::init(config.metrics_port)?;

    let seed: Seed = if config.data_path.exists() {
        let raw = std::fs::read_to_string(&config.data_path)?;
        serde_json::from_str(&raw)?
    } else {
        warn!("{} not found, starting empty", config.data_path.display());
        Seed::default()
    };
    info!(
        "slotdesk: {} bookings, {} staff from {}",
        seed.bookings.len(),
        seed.staff.len(),
        config.data_path.display()
    );

    let now = Local::now().naive_local();
    let store = Arc::new(InMemoryStore::with_records(seed.bookings, seed.staff));
    let staff = store.list_staff().await?;
    let operator = match staff.iter().find(|s| s.role == Role::Admin).or(staff.first()) {
        Some(s) => s.clone(),
        None => store.register_staff("desk", "0000000000", now, Role::Admin),
    };
    let session = Session::login(&operator);
    info!("  session: {} ({:?})", session.name, session.role);

    let engine = Engine::new(store, Arc::new(NotifyHub::new()));
    engine.reload(&session).await?;

    let date = config.date.unwrap_or(now.date());
    let grid = engine.slot_grid(date).await;
    if grid.no_bookings {
        info!("no bookings on {date}");
    }

    let report = Report {
        date,
        grid,
        global: engine.global_stats().await,
        clients: engine.client_rollup().await,
        staff: engine.staff_rollup(&session).await.ok(),
        period: engine.period_rollup(config.period, now).await,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
