use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::SchedulingError;
use crate::types::{Appointment, Principal, SlotView, Timeslot, UserId};

/// Storage seam implemented by the in-memory and the database store. Every
/// mutating operation is one atomic unit: guards are re-checked inside the
/// store's own transactional boundary and a failed guard leaves nothing
/// modified. Notifications are emitted after the unit commits and never
/// affect the result.
pub trait SchedulingBackend: Clone + Send + Sync + 'static {
    /// Lazily materializes the slot for (counselor, date, hour). The default
    /// availability is deliberately a caller decision: the availability-grid
    /// path creates slots closed, the booking path creates them open.
    /// Hours outside the canonical grid are rejected as NotFound.
    fn get_or_create_slot(
        &self,
        counselor: UserId,
        date: NaiveDate,
        hour: u8,
        default_available: bool,
    ) -> Result<Timeslot, SchedulingError>;

    /// Flips availability of a slot owned by `owner`; returns the new value.
    fn toggle_slot(&self, slot_id: Uuid, owner: UserId) -> Result<bool, SchedulingError>;

    /// The 8 canonical hours in order, persisted rows merged in, missing rows
    /// reported with `baseline` availability.
    fn list_slots_for_date(
        &self,
        counselor: UserId,
        date: NaiveDate,
        baseline: bool,
    ) -> Result<Vec<SlotView>, SchedulingError>;

    fn book(
        &self,
        student: UserId,
        counselor: UserId,
        date: NaiveDate,
        hour: u8,
        program: String,
    ) -> Result<Appointment, SchedulingError>;

    fn confirm(&self, appointment_id: Uuid, actor: Principal)
        -> Result<Appointment, SchedulingError>;

    fn cancel(&self, appointment_id: Uuid, actor: Principal)
        -> Result<Appointment, SchedulingError>;

    fn complete(
        &self,
        appointment_id: Uuid,
        actor: Principal,
    ) -> Result<Appointment, SchedulingError>;

    fn reschedule(
        &self,
        appointment_id: Uuid,
        actor: Principal,
        date: NaiveDate,
        hour: u8,
    ) -> Result<Appointment, SchedulingError>;

    /// Appointments visible to the caller: own bookings for students, own
    /// caseload for counselors.
    fn appointments_for(&self, principal: Principal) -> Result<Vec<Appointment>, SchedulingError>;
}
