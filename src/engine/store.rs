use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use dashmap::DashMap;

use crate::model::*;

/// Failures reported by a booking store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Network or backend failure.
    Transport(String),
    NotFound(BookingId),
    /// The store rejected the input.
    Validation(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Transport(e) => write!(f, "store unavailable: {e}"),
            StoreError::NotFound(id) => write!(f, "booking not found: {id}"),
            StoreError::Validation(msg) => write!(f, "rejected by store: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Backend holding bookings and staff. The engine only ever talks to this.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Newest first; bookings sharing a date-time keep creation order.
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError>;

    async fn list_staff(&self) -> Result<Vec<Staff>, StoreError>;

    async fn create_booking(
        &self,
        booking: NewBooking,
        created_by: Option<StaffId>,
    ) -> Result<(), StoreError>;

    async fn edit_booking(&self, edit: BookingEdit) -> Result<(), StoreError>;

    async fn set_status(&self, id: BookingId, status: BookingStatus) -> Result<(), StoreError>;

    async fn delete_booking(&self, id: BookingId) -> Result<(), StoreError>;

    /// `None` when the phone has no bookings at all.
    async fn client_history(&self, phone: &str) -> Result<Option<ClientHistory>, StoreError>;
}

/// Process-local store. Ids are assigned in insertion order.
pub struct InMemoryStore {
    bookings: DashMap<BookingId, Booking>,
    staff: DashMap<StaffId, Staff>,
    next_booking_id: AtomicI64,
    next_staff_id: AtomicI64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            bookings: DashMap::new(),
            staff: DashMap::new(),
            next_booking_id: AtomicI64::new(1),
            next_staff_id: AtomicI64::new(1),
        }
    }

    /// Build a store from existing records, keeping their ids.
    pub fn with_records(bookings: Vec<Booking>, staff: Vec<Staff>) -> Self {
        let store = Self::new();
        let max_booking = bookings.iter().map(|b| b.id).max().unwrap_or(0);
        let max_staff = staff.iter().map(|s| s.id).max().unwrap_or(0);
        for b in bookings {
            store.bookings.insert(b.id, b);
        }
        for s in staff {
            store.staff.insert(s.id, s);
        }
        store.next_booking_id.store(max_booking + 1, Ordering::SeqCst);
        store.next_staff_id.store(max_staff + 1, Ordering::SeqCst);
        store
    }

    // ── Staff ────────────────────────────────────────────────

    pub fn register_staff(
        &self,
        name: &str,
        phone: &str,
        registered_at: NaiveDateTime,
        role: Role,
    ) -> Staff {
        let id = self.next_staff_id.fetch_add(1, Ordering::SeqCst);
        let staff = Staff {
            id,
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            registered_at,
            role,
        };
        self.staff.insert(id, staff.clone());
        staff
    }

    /// Role elevation happens outside the core; this is the hook for it.
    pub fn set_role(&self, id: StaffId, role: Role) -> bool {
        match self.staff.get_mut(&id) {
            Some(mut s) => {
                s.role = role;
                true
            }
            None => false,
        }
    }

    // ── Introspection ────────────────────────────────────────

    pub fn booking_count(&self) -> usize {
        self.bookings.len()
    }

    pub fn get_booking(&self, id: BookingId) -> Option<Booking> {
        self.bookings.get(&id).map(|e| e.value().clone())
    }

    fn has_pending_at(&self, phone: &str, date: NaiveDateTime, except: Option<BookingId>) -> bool {
        self.bookings.iter().any(|e| {
            let b = e.value();
            Some(b.id) != except
                && b.phone == phone
                && b.date == date
                && b.status == BookingStatus::Pending
        })
    }
}

fn require_text(field: &'static str, value: &str) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let mut all: Vec<Booking> = self.bookings.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn list_staff(&self) -> Result<Vec<Staff>, StoreError> {
        let mut all: Vec<Staff> = self.staff.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|s| s.id);
        Ok(all)
    }

    async fn create_booking(
        &self,
        booking: NewBooking,
        created_by: Option<StaffId>,
    ) -> Result<(), StoreError> {
        let name = require_text("name", &booking.name)?;
        let phone = require_text("phone", &booking.phone)?;
        if let Some(staff_id) = created_by
            && !self.staff.contains_key(&staff_id)
        {
            return Err(StoreError::Validation(format!("unknown staff member {staff_id}")));
        }
        if self.has_pending_at(&phone, booking.date, None) {
            return Err(StoreError::Validation(
                "client already has a pending booking at this time".into(),
            ));
        }

        let id = self.next_booking_id.fetch_add(1, Ordering::SeqCst);
        self.bookings.insert(
            id,
            Booking {
                id,
                name,
                phone,
                date: booking.date,
                purchased: booking.purchased,
                status: BookingStatus::Pending,
                created_by,
            },
        );
        Ok(())
    }

    async fn edit_booking(&self, edit: BookingEdit) -> Result<(), StoreError> {
        let name = require_text("name", &edit.name)?;
        let phone = require_text("phone", &edit.phone)?;
        let mut entry = self
            .bookings
            .get_mut(&edit.id)
            .ok_or(StoreError::NotFound(edit.id))?;
        let b = entry.value_mut();
        b.name = name;
        b.phone = phone;
        b.date = edit.date;
        b.purchased = edit.purchased;
        b.status = edit.status;
        Ok(())
    }

    async fn set_status(&self, id: BookingId, status: BookingStatus) -> Result<(), StoreError> {
        let mut entry = self.bookings.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        entry.value_mut().status = status;
        Ok(())
    }

    async fn delete_booking(&self, id: BookingId) -> Result<(), StoreError> {
        self.bookings
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn client_history(&self, phone: &str) -> Result<Option<ClientHistory>, StoreError> {
        let phone = phone.trim();
        let mut history: Option<ClientHistory> = None;
        let mut latest: Option<(NaiveDateTime, BookingId)> = None;
        for e in self.bookings.iter() {
            let b = e.value();
            if b.phone != phone {
                continue;
            }
            let h = history.get_or_insert_with(ClientHistory::default);
            match b.status {
                BookingStatus::Attended => h.attended += 1,
                BookingStatus::Missed => h.missed += 1,
                BookingStatus::Pending => {}
            }
            if latest.is_none_or(|key| (b.date, b.id) > key) {
                latest = Some((b.date, b.id));
                h.last_name = b.name.clone();
            }
        }
        Ok(history)
    }
}
