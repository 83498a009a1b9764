use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::sync::watch;

use crate::debounce::Debouncer;
use crate::model::*;

/// Status axis of the booking list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFacet {
    #[default]
    All,
    Only(BookingStatus),
}

impl StatusFacet {
    pub fn matches(&self, status: BookingStatus) -> bool {
        match self {
            StatusFacet::All => true,
            StatusFacet::Only(s) => *s == status,
        }
    }
}

impl FromStr for StatusFacet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(StatusFacet::All),
            other => other.parse().map(StatusFacet::Only),
        }
    }
}

/// A booking as the list shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRow {
    pub booking_id: BookingId,
    pub status: BookingStatus,
    /// Everything visible on the row, in display order.
    pub text: String,
    #[serde(skip)]
    haystack: String,
}

/// Render the visible text of one list row.
pub fn render_row(booking: &Booking, creator: Option<&str>, now: NaiveDateTime) -> String {
    let mut parts: Vec<String> = vec![booking.name.clone()];
    if booking.purchased {
        parts.push("purchased".into());
    }
    parts.push(booking.phone.clone());
    if let Some(creator) = creator {
        parts.push(creator.to_string());
    }

    let mut when = booking.date.format("%d %b %Y %H:%M").to_string();
    if booking.date.date() == now.date() {
        when.push_str(" (today)");
    } else if booking.date < now && booking.status == BookingStatus::Pending {
        when.push_str(" (overdue)");
    }
    parts.push(when);
    parts.push(booking.status.label().to_string());
    parts.join(" · ")
}

/// Rows of the currently loaded list with the two filter axes applied on
/// top. Filtering never refetches; it only hides rows.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    rows: Vec<SearchRow>,
    term: String,
    facet: StatusFacet,
}

impl SearchIndex {
    pub fn build(bookings: &[Booking], staff: &[Staff], now: NaiveDateTime) -> Self {
        let names: HashMap<StaffId, &str> = staff.iter().map(|s| (s.id, s.name.as_str())).collect();
        let rows = bookings
            .iter()
            .map(|b| {
                let creator = b.created_by.and_then(|id| names.get(&id).copied());
                let text = render_row(b, creator, now);
                SearchRow {
                    booking_id: b.id,
                    status: b.status,
                    haystack: text.to_lowercase(),
                    text,
                }
            })
            .collect();
        Self {
            rows,
            term: String::new(),
            facet: StatusFacet::All,
        }
    }

    pub fn set_term(&mut self, term: &str) {
        self.term = term.trim().to_lowercase();
    }

    pub fn set_facet(&mut self, facet: StatusFacet) {
        self.facet = facet;
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn facet(&self) -> StatusFacet {
        self.facet
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn is_visible(&self, row: &SearchRow) -> bool {
        self.facet.matches(row.status)
            && (self.term.is_empty() || row.haystack.contains(&self.term))
    }

    pub fn visible(&self) -> impl Iterator<Item = &SearchRow> {
        self.rows.iter().filter(|r| self.is_visible(r))
    }

    pub fn visible_ids(&self) -> Vec<BookingId> {
        self.visible().map(|r| r.booking_id).collect()
    }

    pub fn is_filtering(&self) -> bool {
        !self.term.is_empty() || self.facet != StatusFacet::All
    }

    /// An active filter hides every row.
    pub fn is_empty_result(&self) -> bool {
        self.is_filtering() && self.visible().next().is_none()
    }
}

/// Debounced free-text input. The settled term is published on a watch
/// channel; feed it to [`SearchIndex::set_term`].
pub struct SearchBox {
    debouncer: Debouncer,
    term: Arc<watch::Sender<String>>,
}

impl SearchBox {
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            term: Arc::new(watch::channel(String::new()).0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.term.subscribe()
    }

    /// The last settled term.
    pub fn term(&self) -> String {
        self.term.borrow().clone()
    }

    pub fn on_input(&mut self, raw: &str) {
        let term = raw.trim().to_lowercase();
        let sender = self.term.clone();
        self.debouncer.schedule(async move {
            sender.send_replace(term);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    fn booking(id: BookingId, name: &str, phone: &str, d: u32, status: BookingStatus) -> Booking {
        Booking {
            id,
            name: name.into(),
            phone: phone.into(),
            date: slot_on(day(d), "10:00").unwrap(),
            purchased: false,
            status,
            created_by: Some(1),
        }
    }

    fn staff() -> Vec<Staff> {
        vec![Staff {
            id: 1,
            name: "Marta".into(),
            phone: "48111222333".into(),
            registered_at: day(1).and_time(NaiveTime::MIN),
            role: Role::Worker,
        }]
    }

    fn now() -> NaiveDateTime {
        day(10).and_hms_opt(12, 0, 0).unwrap()
    }

    fn index() -> SearchIndex {
        let bookings = vec![
            booking(1, "Anna Nowak", "1234567890", 10, BookingStatus::Pending),
            booking(2, "Ben Kowalski", "5550001111", 8, BookingStatus::Attended),
            booking(3, "Cecylia", "5550002222", 9, BookingStatus::Missed),
            booking(4, "Dorota", "5550003333", 7, BookingStatus::Pending),
        ];
        SearchIndex::build(&bookings, &staff(), now())
    }

    #[test]
    fn rendered_text_includes_visible_fields() {
        let mut b = booking(1, "Anna", "1234567890", 10, BookingStatus::Pending);
        b.purchased = true;
        let text = render_row(&b, Some("Marta"), now());
        assert!(text.contains("Anna"));
        assert!(text.contains("purchased"));
        assert!(text.contains("1234567890"));
        assert!(text.contains("Marta"));
        assert!(text.contains("(today)"));
        assert!(text.contains("waiting"));
    }

    #[test]
    fn past_pending_is_overdue() {
        let b = booking(1, "Anna", "1", 3, BookingStatus::Pending);
        assert!(render_row(&b, None, now()).contains("(overdue)"));
        let done = booking(2, "Ben", "2", 3, BookingStatus::Attended);
        assert!(!render_row(&done, None, now()).contains("(overdue)"));
    }

    #[test]
    fn term_matches_case_insensitively_on_any_field() {
        let mut idx = index();
        idx.set_term("  KOWAL ");
        assert_eq!(idx.visible_ids(), vec![2]);

        idx.set_term("555000");
        assert_eq!(idx.visible_ids(), vec![2, 3, 4]);

        idx.set_term("marta");
        assert_eq!(idx.visible().count(), 4);
    }

    #[test]
    fn facet_filters_by_exact_status() {
        let mut idx = index();
        idx.set_facet(StatusFacet::Only(BookingStatus::Pending));
        assert_eq!(idx.visible_ids(), vec![1, 4]);
        idx.set_facet(StatusFacet::All);
        assert_eq!(idx.visible().count(), 4);
    }

    #[test]
    fn axes_combine() {
        let mut idx = index();
        idx.set_facet(StatusFacet::Only(BookingStatus::Pending));
        idx.set_term("5550");
        assert_eq!(idx.visible_ids(), vec![4]);
    }

    #[test]
    fn empty_result_only_when_filtering() {
        let mut idx = index();
        assert!(!idx.is_empty_result());

        idx.set_term("nobody");
        assert!(idx.is_empty_result());

        let empty = SearchIndex::build(&[], &[], now());
        assert!(empty.is_empty());
        assert!(!empty.is_empty_result());
    }

    #[test]
    fn facet_parse() {
        assert_eq!("all".parse::<StatusFacet>().unwrap(), StatusFacet::All);
        assert_eq!(
            "missed".parse::<StatusFacet>().unwrap(),
            StatusFacet::Only(BookingStatus::Missed)
        );
        assert!("gone".parse::<StatusFacet>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn search_box_publishes_settled_term_only() {
        let mut search = SearchBox::new(Duration::from_millis(300));
        let mut rx = search.subscribe();

        search.on_input("a");
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.on_input("an");
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.on_input("ANN");

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "ann");
        assert_eq!(search.term(), "ann");

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!rx.has_changed().unwrap());
    }
}
