use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;

use crate::model::*;

/// Status and upsell counters shared by every rollup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub total: usize,
    pub attended: usize,
    pub missed: usize,
    pub pending: usize,
    pub purchased: usize,
}

impl Tally {
    pub fn add(&mut self, booking: &Booking) {
        self.total += 1;
        match booking.status {
            BookingStatus::Attended => self.attended += 1,
            BookingStatus::Missed => self.missed += 1,
            BookingStatus::Pending => self.pending += 1,
        }
        if booking.purchased {
            self.purchased += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl<'a> FromIterator<&'a Booking> for Tally {
    fn from_iter<I: IntoIterator<Item = &'a Booking>>(iter: I) -> Self {
        let mut tally = Tally::default();
        for b in iter {
            tally.add(b);
        }
        tally
    }
}

// ── Global ───────────────────────────────────────────────────────

pub fn aggregate_global(bookings: &[Booking]) -> Tally {
    bookings.iter().collect()
}

// ── Per client ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRollup {
    pub phone: String,
    /// Name on the client's latest booking.
    pub name: String,
    pub counts: Tally,
    pub last_visit: Option<NaiveDateTime>,
}

/// One row per distinct phone, most recent visit first.
///
/// On equal date-times the booking that comes later in `bookings` supplies
/// the name. Rows without a last visit sort after all dated rows; the sort is
/// stable, so ties keep first-seen order.
pub fn aggregate_clients(bookings: &[Booking]) -> Vec<ClientRollup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<ClientRollup> = Vec::new();

    for b in bookings {
        let i = *index.entry(b.phone.as_str()).or_insert_with(|| {
            rows.push(ClientRollup {
                phone: b.phone.clone(),
                name: String::new(),
                counts: Tally::default(),
                last_visit: None,
            });
            rows.len() - 1
        });
        let row = &mut rows[i];
        row.counts.add(b);
        if row.last_visit.is_none_or(|last| b.date >= last) {
            row.last_visit = Some(b.date);
            row.name = b.name.clone();
        }
    }

    rows.sort_by(|a, b| match (a.last_visit, b.last_visit) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    rows
}

// ── Per staff member ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffRollup {
    pub staff_id: StaffId,
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub counts: Tally,
}

/// One row per staff member, in staff-list order, zero rows included.
/// Bookings without a creator, or created by someone not in `staff`, are
/// skipped here only.
pub fn aggregate_staff(bookings: &[Booking], staff: &[Staff]) -> Vec<StaffRollup> {
    let mut by_creator: HashMap<StaffId, Tally> = HashMap::new();
    for b in bookings {
        if let Some(creator) = b.created_by {
            by_creator.entry(creator).or_default().add(b);
        }
    }

    staff
        .iter()
        .map(|s| StaffRollup {
            staff_id: s.id,
            name: s.name.clone(),
            phone: s.phone.clone(),
            role: s.role,
            counts: by_creator.get(&s.id).copied().unwrap_or_default(),
        })
        .collect()
}

/// Everything one staff member booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffHistory {
    pub staff_id: StaffId,
    pub counts: Tally,
    /// Newest first.
    pub bookings: Vec<Booking>,
}

pub fn staff_history(bookings: &[Booking], staff_id: StaffId) -> StaffHistory {
    let mut own: Vec<Booking> = bookings
        .iter()
        .filter(|b| b.created_by == Some(staff_id))
        .cloned()
        .collect();
    own.sort_by(|a, b| b.date.cmp(&a.date));
    StaffHistory {
        staff_id,
        counts: own.iter().collect(),
        bookings: own,
    }
}

// ── Per period ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodBucket {
    pub date: NaiveDate,
    pub label: String,
    pub counts: Tally,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeriodRollup {
    /// Nothing fell inside `[from, to]`.
    NoData {
        period: Period,
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
    Report {
        period: Period,
        from: NaiveDateTime,
        to: NaiveDateTime,
        totals: Tally,
        /// Chronological.
        buckets: Vec<PeriodBucket>,
    },
}

impl PeriodRollup {
    pub fn is_no_data(&self) -> bool {
        matches!(self, PeriodRollup::NoData { .. })
    }

    pub fn totals(&self) -> Tally {
        match self {
            PeriodRollup::NoData { .. } => Tally::default(),
            PeriodRollup::Report { totals, .. } => *totals,
        }
    }

    pub fn buckets(&self) -> &[PeriodBucket] {
        match self {
            PeriodRollup::NoData { .. } => &[],
            PeriodRollup::Report { buckets, .. } => buckets,
        }
    }
}

/// Midnight opening the period that contains `now`. Weeks start on Monday,
/// so a Sunday belongs to the week that began six days earlier.
pub fn period_start(period: Period, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date();
    let first_day = match period {
        Period::Day => today,
        Period::Week => {
            today - TimeDelta::days(i64::from(today.weekday().num_days_from_monday()))
        }
        Period::Month => today.with_day(1).unwrap_or(today),
    };
    first_day.and_time(NaiveTime::MIN)
}

fn bucket_label(period: Period, date: NaiveDate) -> String {
    match period {
        Period::Day | Period::Month => date.format("%Y-%m-%d").to_string(),
        Period::Week => date.format("%a %Y-%m-%d").to_string(),
    }
}

/// Roll up bookings dated within `[period_start(period, now), now]`.
/// Bookings later than `now` are excluded even when they fall on today.
pub fn aggregate_period(period: Period, bookings: &[Booking], now: NaiveDateTime) -> PeriodRollup {
    let from = period_start(period, now);
    let mut by_day: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
    let mut totals = Tally::default();

    for b in bookings.iter().filter(|b| b.date >= from && b.date <= now) {
        by_day.entry(b.date.date()).or_default().add(b);
        totals.add(b);
    }

    if totals.is_empty() {
        return PeriodRollup::NoData {
            period,
            from,
            to: now,
        };
    }

    let buckets = by_day
        .into_iter()
        .map(|(date, counts)| PeriodBucket {
            date,
            label: bucket_label(period, date),
            counts,
        })
        .collect();

    PeriodRollup::Report {
        period,
        from,
        to: now,
        totals,
        buckets,
    }
}
