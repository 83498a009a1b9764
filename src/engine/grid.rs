use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::limits::SLOT_CAPACITY;
use crate::model::*;

// ── Slot grid ─────────────────────────────────────────────────────

/// One catalog time of day with exactly `SLOT_CAPACITY` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRow {
    pub time: NaiveTime,
    pub cells: Vec<Option<Booking>>,
    /// Same-slot bookings that did not fit into the cells.
    pub overflow: usize,
}

impl SlotRow {
    fn empty(time: NaiveTime) -> Self {
        Self {
            time,
            cells: vec![None; SLOT_CAPACITY],
            overflow: 0,
        }
    }

    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn free_cells(&self) -> usize {
        self.cells.len() - self.filled()
    }

    pub fn is_overbooked(&self) -> bool {
        self.overflow > 0
    }

    pub fn bookings(&self) -> impl Iterator<Item = &Booking> {
        self.cells.iter().flatten()
    }
}

/// The placement of one day's bookings into the slot catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotGrid {
    pub date: NaiveDate,
    pub rows: Vec<SlotRow>,
    /// No booking at all falls on `date`. The rows are still present, all empty.
    pub no_bookings: bool,
    /// Bookings on `date` whose time is not a catalog slot.
    pub off_catalog: usize,
}

impl SlotGrid {
    pub fn placed(&self) -> usize {
        self.rows.iter().map(SlotRow::filled).sum()
    }

    pub fn overflow(&self) -> usize {
        self.rows.iter().map(|r| r.overflow).sum()
    }

    pub fn row(&self, time: NaiveTime) -> Option<&SlotRow> {
        slot_index(time).and_then(|i| self.rows.get(i))
    }
}

/// Place the bookings of `date` into the catalog grid.
///
/// Cells fill in the order bookings arrive; nothing is re-sorted. Bookings at
/// off-catalog times or past capacity are left out of the grid (counted in
/// `off_catalog` / `overflow`), but the input collection is untouched.
pub fn build_slot_grid(date: NaiveDate, bookings: &[Booking]) -> SlotGrid {
    let mut rows: Vec<SlotRow> = slot_catalog().into_iter().map(SlotRow::empty).collect();
    let mut fill = vec![0usize; rows.len()];
    let mut matched = 0usize;
    let mut off_catalog = 0usize;

    for booking in bookings.iter().filter(|b| b.date.date() == date) {
        matched += 1;
        let Some(idx) = booking.slot_index() else {
            off_catalog += 1;
            continue;
        };
        let (Some(row), Some(used)) = (rows.get_mut(idx), fill.get_mut(idx)) else {
            off_catalog += 1;
            continue;
        };
        if *used < SLOT_CAPACITY {
            row.cells[*used] = Some(booking.clone());
            *used += 1;
        } else {
            row.overflow += 1;
        }
    }

    SlotGrid {
        date,
        rows,
        no_bookings: matched == 0,
        off_catalog,
    }
}
