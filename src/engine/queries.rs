use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::model::*;
use crate::observability::GRID_OVERFLOW_TOTAL;
use crate::search::SearchIndex;

use super::aggregate::{
    aggregate_clients, aggregate_global, aggregate_period, aggregate_staff, staff_history,
    ClientRollup, PeriodRollup, StaffHistory, StaffRollup, Tally,
};
use super::grid::{build_slot_grid, SlotGrid};
use super::{Engine, EngineError};

impl Engine {
    pub async fn find_booking(&self, id: BookingId) -> Option<Booking> {
        self.snapshot()
            .await
            .bookings
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    pub async fn slot_grid(&self, date: NaiveDate) -> SlotGrid {
        let grid = build_slot_grid(date, &self.snapshot().await.bookings);
        let overflow = grid.overflow();
        if overflow > 0 {
            warn!("{date}: {overflow} bookings exceed slot capacity and are not shown");
            metrics::counter!(GRID_OVERFLOW_TOTAL).increment(overflow as u64);
        }
        grid
    }

    pub async fn global_stats(&self) -> Tally {
        aggregate_global(&self.snapshot().await.bookings)
    }

    pub async fn client_rollup(&self) -> Vec<ClientRollup> {
        aggregate_clients(&self.snapshot().await.bookings)
    }

    pub async fn period_rollup(&self, period: Period, now: NaiveDateTime) -> PeriodRollup {
        aggregate_period(period, &self.snapshot().await.bookings, now)
    }

    /// Per-staff rollup; admins only, since only their reloads fetch staff.
    pub async fn staff_rollup(&self, session: &Session) -> Result<Vec<StaffRollup>, EngineError> {
        if !session.is_admin() {
            return Err(EngineError::Unauthorized("staff statistics are for admins"));
        }
        let snapshot = self.snapshot().await;
        Ok(aggregate_staff(&snapshot.bookings, &snapshot.staff))
    }

    /// A staff member's own bookings. Admins may look at anyone's.
    pub async fn staff_history(
        &self,
        session: &Session,
        staff_id: StaffId,
    ) -> Result<StaffHistory, EngineError> {
        if !session.is_admin() && session.staff_id != staff_id {
            return Err(EngineError::Unauthorized("another staff member's history"));
        }
        Ok(staff_history(&self.snapshot().await.bookings, staff_id))
    }

    /// Searchable rows for the current booking list.
    pub async fn search_index(&self, now: NaiveDateTime) -> SearchIndex {
        let snapshot = self.snapshot().await;
        SearchIndex::build(&snapshot.bookings, &snapshot.staff, now)
    }
}
