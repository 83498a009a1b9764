use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::debounce::Debouncer;
use crate::engine::BookingStore;
use crate::limits::MIN_LOOKUP_PHONE_LEN;
use crate::model::ClientHistory;
use crate::observability::HISTORY_LOOKUPS_TOTAL;

/// What a client's past attendance says about a new booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HistorySignal {
    /// The client has skipped at least one appointment.
    Risk { missed: u32, attended: u32 },
    Loyal { attended: u32 },
}

/// Any miss outweighs any number of visits; no history means no signal.
pub fn classify_history(history: Option<&ClientHistory>) -> Option<HistorySignal> {
    let h = history?;
    if h.missed > 0 {
        Some(HistorySignal::Risk {
            missed: h.missed,
            attended: h.attended,
        })
    } else if h.attended > 0 {
        Some(HistorySignal::Loyal {
            attended: h.attended,
        })
    } else {
        None
    }
}

/// The name to put into a blank name field. Never overrides typed input.
pub fn suggest_name(current_name: &str, history: Option<&ClientHistory>) -> Option<String> {
    if !current_name.trim().is_empty() {
        return None;
    }
    history
        .map(|h| h.last_name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Latest advice for the booking form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Advice {
    /// The phone this advice was computed for; empty when cleared.
    pub phone: String,
    pub signal: Option<HistorySignal>,
    pub prefill_name: Option<String>,
}

/// Watches the phone field of the booking form and looks up the client's
/// history once typing pauses.
///
/// The name field is tracked separately and read when the lookup fires, so
/// a name typed during the pause blocks the prefill.
pub struct HistoryAdvisor {
    store: Arc<dyn BookingStore>,
    debouncer: Debouncer,
    advice: Arc<watch::Sender<Advice>>,
    name: watch::Sender<String>,
}

impl HistoryAdvisor {
    pub fn new(store: Arc<dyn BookingStore>, delay: Duration) -> Self {
        Self {
            store,
            debouncer: Debouncer::new(delay),
            advice: Arc::new(watch::channel(Advice::default()).0),
            name: watch::channel(String::new()).0,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Advice> {
        self.advice.subscribe()
    }

    pub fn current(&self) -> Advice {
        self.advice.borrow().clone()
    }

    /// The name field changed. Never schedules a lookup.
    pub fn on_name_input(&self, name: &str) {
        self.name.send_replace(name.to_string());
    }

    /// A keystroke in the phone field.
    pub fn on_phone_input(&mut self, phone: &str) {
        let phone = phone.trim().to_string();
        let store = self.store.clone();
        let advice = self.advice.clone();
        let name = self.name.subscribe();
        self.debouncer.schedule(async move {
            lookup(store.as_ref(), &advice, &name, phone).await;
        });
    }

    /// Drop any pending lookup, any shown advice and the tracked name (e.g.
    /// after the form was submitted).
    pub fn clear(&mut self) {
        self.debouncer.cancel();
        self.advice.send_replace(Advice::default());
        self.name.send_replace(String::new());
    }
}

async fn lookup(
    store: &dyn BookingStore,
    advice: &watch::Sender<Advice>,
    name: &watch::Receiver<String>,
    phone: String,
) {
    if phone.chars().count() < MIN_LOOKUP_PHONE_LEN {
        advice.send_if_modified(|shown| {
            let had_advice = *shown != Advice::default();
            *shown = Advice::default();
            had_advice
        });
        return;
    }

    match store.client_history(&phone).await {
        Ok(history) => {
            metrics::counter!(HISTORY_LOOKUPS_TOTAL, "status" => "ok").increment(1);
            let signal = classify_history(history.as_ref());
            let prefill_name = suggest_name(&name.borrow(), history.as_ref());
            debug!("history for {phone}: {signal:?}");
            advice.send_replace(Advice {
                phone,
                signal,
                prefill_name,
            });
        }
        Err(e) => {
            metrics::counter!(HISTORY_LOOKUPS_TOTAL, "status" => "error").increment(1);
            warn!("history lookup for {phone} failed: {e}");
        }
    }
}
