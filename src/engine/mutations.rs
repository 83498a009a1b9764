use tracing::{debug, info, warn};

use crate::model::*;
use crate::notify::NoticeLevel;

use super::store::StoreError;
use super::validate::{validate_edit, validate_new_booking};
use super::{record_store_call, Engine, EngineError};

impl Engine {
    /// Book a client into a slot. The creator is the session's staff member;
    /// the booking starts out pending.
    pub async fn create_booking(
        &self,
        session: &Session,
        booking: NewBooking,
    ) -> Result<(), EngineError> {
        if let Err(e) = validate_new_booking(&booking) {
            self.notify.notice(NoticeLevel::Danger, e.to_string());
            return Err(e);
        }
        let done = format!(
            "booked {} at {}",
            booking.name.trim(),
            booking.date.format("%Y-%m-%d %H:%M")
        );
        let result = self
            .store
            .create_booking(booking, Some(session.staff_id))
            .await;
        self.settle(session, "create", result, done).await
    }

    /// Replace every editable field, status included. Any status may follow
    /// any other here.
    pub async fn edit_booking(
        &self,
        session: &Session,
        edit: BookingEdit,
    ) -> Result<(), EngineError> {
        if let Err(e) = validate_edit(&edit) {
            self.notify.notice(NoticeLevel::Danger, e.to_string());
            return Err(e);
        }
        let id = edit.id;
        let result = self.store.edit_booking(edit).await;
        let done = format!("booking {id} updated");
        self.settle(session, "edit", result, done).await
    }

    /// Record an attendance outcome. The only precondition is that the
    /// booking still exists.
    pub async fn set_status(
        &self,
        session: &Session,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<(), EngineError> {
        let result = self.store.set_status(id, status).await;
        let done = format!("booking {id} marked {}", status.label());
        self.settle(session, "set_status", result, done).await
    }

    pub async fn delete_booking(
        &self,
        session: &Session,
        id: BookingId,
    ) -> Result<(), EngineError> {
        let result = self.store.delete_booking(id).await;
        let done = format!("booking {id} deleted");
        self.settle(session, "delete", result, done).await
    }

    /// Report the outcome of a store mutation and bring the views up to date.
    ///
    /// Success and not-found both reload (the latter so a vanished row drops
    /// out of the view). Once the store has applied a change the outcome is
    /// `Ok` even if that reload fails; the reload reports its own failure and
    /// the previous snapshot stays. Other store failures leave the cache as
    /// it was.
    async fn settle(
        &self,
        session: &Session,
        op: &'static str,
        result: Result<(), StoreError>,
        success: String,
    ) -> Result<(), EngineError> {
        match result {
            Ok(()) => {
                record_store_call(op, true);
                info!("{op} by staff {}: {success}", session.staff_id);
                self.notify.notice(NoticeLevel::Success, success);
                if let Err(e) = self.reload(session).await {
                    warn!("{op} applied but reload failed: {e}");
                }
                Ok(())
            }
            Err(StoreError::NotFound(id)) => {
                record_store_call(op, false);
                warn!("{op} by staff {}: booking {id} not found", session.staff_id);
                self.notify
                    .notice(NoticeLevel::Danger, format!("booking {id} no longer exists"));
                if let Err(e) = self.reload(session).await {
                    debug!("reload after missing booking {id} failed: {e}");
                }
                Err(EngineError::NotFound(id))
            }
            Err(e) => {
                record_store_call(op, false);
                warn!("{op} by staff {} failed: {e}", session.staff_id);
                self.notify.notice(NoticeLevel::Danger, e.to_string());
                Err(e.into())
            }
        }
    }
}
