mod aggregate;
mod error;
mod grid;
mod mutations;
mod queries;
mod store;
mod validate;

pub use aggregate::{
    aggregate_clients, aggregate_global, aggregate_period, aggregate_staff, period_start,
    staff_history, ClientRollup, PeriodBucket, PeriodRollup, StaffHistory, StaffRollup, Tally,
};
pub use error::EngineError;
pub use grid::{build_slot_grid, SlotGrid, SlotRow};
pub use store::{BookingStore, InMemoryStore, StoreError};

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::model::*;
use crate::notify::{DeskEvent, NoticeLevel, NotifyHub};
use crate::observability::{RELOAD_DURATION_SECONDS, STORE_CALLS_TOTAL};

/// The last collection fetched from the store. Replaced wholesale on reload,
/// never patched.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Number of successful reloads that produced this snapshot.
    pub generation: u64,
    pub bookings: Vec<Booking>,
    /// Only fetched for admin sessions.
    pub staff: Vec<Staff>,
}

/// Entry point for the presentation layer: routes mutations to the store,
/// reloads after each confirmed change, and serves derived views from the
/// cached snapshot.
pub struct Engine {
    store: Arc<dyn BookingStore>,
    pub notify: Arc<NotifyHub>,
    cache: RwLock<Arc<Snapshot>>,
}

fn record_store_call(op: &'static str, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(STORE_CALLS_TOTAL, "op" => op, "status" => status).increment(1);
}

impl Engine {
    pub fn new(store: Arc<dyn BookingStore>, notify: Arc<NotifyHub>) -> Self {
        Self {
            store,
            notify,
            cache: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    pub fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }

    /// Fetch bookings (and staff, for admins) and replace the cache.
    /// On failure the previous snapshot stays in place.
    pub async fn reload(&self, session: &Session) -> Result<Arc<Snapshot>, EngineError> {
        let started = Instant::now();
        let fetched = if session.is_admin() {
            futures::try_join!(self.store.list_bookings(), self.store.list_staff())
        } else {
            self.store
                .list_bookings()
                .await
                .map(|bookings| (bookings, Vec::new()))
        };

        let (bookings, staff) = match fetched {
            Ok(records) => {
                record_store_call("list", true);
                records
            }
            Err(e) => {
                record_store_call("list", false);
                warn!("reload failed: {e}");
                self.notify
                    .notice(NoticeLevel::Danger, format!("could not load bookings: {e}"));
                return Err(e.into());
            }
        };

        let snapshot = {
            let mut cache = self.cache.write().await;
            let next = Arc::new(Snapshot {
                generation: cache.generation + 1,
                bookings,
                staff,
            });
            *cache = next.clone();
            next
        };

        metrics::histogram!(RELOAD_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        debug!(
            "reload #{} loaded {} bookings, {} staff",
            snapshot.generation,
            snapshot.bookings.len(),
            snapshot.staff.len()
        );
        self.notify.send(&DeskEvent::Reloaded {
            generation: snapshot.generation,
            bookings: snapshot.bookings.len(),
        });
        Ok(snapshot)
    }

    /// The cached collection as of the last successful reload.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.cache.read().await.clone()
    }
}
