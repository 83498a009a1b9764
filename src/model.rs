use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::limits::*;

/// Store-assigned booking identity.
pub type BookingId = i64;

/// Store-assigned staff identity.
pub type StaffId = i64;

/// Attendance outcome of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Attended,
    Missed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 3] = [
        BookingStatus::Pending,
        BookingStatus::Attended,
        BookingStatus::Missed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Attended => "attended",
            BookingStatus::Missed => "missed",
        }
    }

    /// Human-facing label used in rendered rows and notices.
    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "waiting",
            BookingStatus::Attended => "attended",
            BookingStatus::Missed => "no-show",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(BookingStatus::Pending),
            "attended" => Ok(BookingStatus::Attended),
            "missed" => Ok(BookingStatus::Missed),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// A single appointment as the store reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub name: String,
    /// Client identity key.
    pub phone: String,
    /// Local wall-clock date and slot time.
    pub date: NaiveDateTime,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub created_by: Option<StaffId>,
}

impl Booking {
    /// Catalog slot index of this booking, `None` if the time is off-catalog.
    pub fn slot_index(&self) -> Option<usize> {
        slot_index(self.date.time())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Worker,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub phone: String,
    pub registered_at: NaiveDateTime,
    #[serde(default)]
    pub role: Role,
}

/// Fields a staff member fills in to create a booking. The creator comes from
/// the session, the status always starts as pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub name: String,
    pub phone: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub purchased: bool,
}

/// Full replacement of a booking's editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEdit {
    pub id: BookingId,
    pub name: String,
    pub phone: String,
    pub date: NaiveDateTime,
    pub purchased: bool,
    pub status: BookingStatus,
}

/// What the store knows about a phone number's past visits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientHistory {
    pub last_name: String,
    pub attended: u32,
    pub missed: u32,
}

/// The signed-in staff member. Lives from login to logout and is passed to
/// every operation that needs an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub staff_id: StaffId,
    pub name: String,
    pub role: Role,
}

impl Session {
    pub fn login(staff: &Staff) -> Self {
        Self {
            staff_id: staff.id,
            name: staff.name.clone(),
            role: staff.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Reporting period for rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

// ── Slot catalog ─────────────────────────────────────────────────

/// Catalog slot index for a time of day. Only exact `HH:MM:00` matches count.
pub fn slot_index(time: NaiveTime) -> Option<usize> {
    if time.second() != 0 || time.nanosecond() != 0 {
        return None;
    }
    let minutes = time.hour() * 60 + time.minute();
    if minutes < FIRST_SLOT_MINUTES {
        return None;
    }
    let offset = minutes - FIRST_SLOT_MINUTES;
    if offset % SLOT_STEP_MINUTES != 0 {
        return None;
    }
    let index = (offset / SLOT_STEP_MINUTES) as usize;
    (index < SLOTS_PER_DAY).then_some(index)
}

/// The fixed daily catalog, earliest first.
pub fn slot_catalog() -> Vec<NaiveTime> {
    (0..SLOTS_PER_DAY as u32)
        .filter_map(|i| {
            let minutes = FIRST_SLOT_MINUTES + i * SLOT_STEP_MINUTES;
            NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        })
        .collect()
}

/// Parse an `"HH:MM"` catalog value. Off-catalog times are rejected.
pub fn parse_slot(s: &str) -> Option<NaiveTime> {
    let time = NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()?;
    slot_index(time).map(|_| time)
}

/// Combine a day and a catalog slot into a booking date-time.
pub fn slot_on(date: NaiveDate, slot: &str) -> Option<NaiveDateTime> {
    parse_slot(slot).map(|time| date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_eleven_slots() {
        let catalog = slot_catalog();
        assert_eq!(catalog.len(), SLOTS_PER_DAY);
        assert_eq!(catalog[0], NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(catalog[1], NaiveTime::from_hms_opt(8, 40, 0).unwrap());
        assert_eq!(catalog[10], NaiveTime::from_hms_opt(14, 40, 0).unwrap());
    }

    #[test]
    fn slot_index_matches_catalog_positions() {
        for (i, t) in slot_catalog().into_iter().enumerate() {
            assert_eq!(slot_index(t), Some(i));
        }
    }

    #[test]
    fn off_catalog_times_rejected() {
        let t = |h, m, s| NaiveTime::from_hms_opt(h, m, s).unwrap();
        assert_eq!(slot_index(t(7, 20, 0)), None);
        assert_eq!(slot_index(t(8, 30, 0)), None);
        assert_eq!(slot_index(t(8, 0, 1)), None);
        assert_eq!(slot_index(t(15, 20, 0)), None); // one step past the last slot
    }

    #[test]
    fn parse_slot_accepts_catalog_only() {
        assert!(parse_slot("09:20").is_some());
        assert!(parse_slot(" 14:40 ").is_some());
        assert!(parse_slot("09:30").is_none());
        assert!(parse_slot("nine").is_none());
    }

    #[test]
    fn status_parse_and_display() {
        for s in BookingStatus::ALL {
            assert_eq!(s.as_str().parse::<BookingStatus>().unwrap(), s);
            assert_eq!(s.to_string(), s.as_str());
        }
        assert!("done".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn booking_json_uses_lowercase_status() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let booking = Booking {
            id: 7,
            name: "Anna".into(),
            phone: "1234567890".into(),
            date: slot_on(date, "08:00").unwrap(),
            purchased: false,
            status: BookingStatus::Missed,
            created_by: None,
        };
        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["status"], "missed");
        assert_eq!(json["date"], "2026-03-02T08:00:00");
    }

    #[test]
    fn booking_json_defaults_optional_fields() {
        let booking: Booking = serde_json::from_str(
            r#"{"id":1,"name":"Ola","phone":"555","date":"2026-03-02T08:40:00"}"#,
        )
        .unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(!booking.purchased);
        assert_eq!(booking.created_by, None);
        assert_eq!(booking.slot_index(), Some(1));
    }

    #[test]
    fn session_from_staff() {
        let staff = Staff {
            id: 3,
            name: "Marta".into(),
            phone: "48111222333".into(),
            registered_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            role: Role::Admin,
        };
        let session = Session::login(&staff);
        assert_eq!(session.staff_id, 3);
        assert!(session.is_admin());
    }

    #[test]
    fn period_parse() {
        assert_eq!("Week".parse::<Period>().unwrap(), Period::Week);
        assert!("year".parse::<Period>().is_err());
    }
}
