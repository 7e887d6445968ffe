use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::backend::SchedulingBackend;
use crate::error::SchedulingError;
use crate::lifecycle::{self, Action};
use crate::notify::{EventKind, NotificationSender};
use crate::types::{
    is_canonical_hour, merge_into_grid, Appointment, AppointmentStatus, Principal, Role, SlotView,
    Timeslot, UserId,
};

/// In-memory backend. The single mutex over slots and appointments is the
/// transactional boundary: every check-then-claim sequence runs under one
/// lock acquisition, so concurrent bookings of the same slot serialize and
/// exactly one wins.
#[derive(Debug, Clone)]
pub struct LocalStore {
    state: Arc<Mutex<StoreState>>,
    notifications: NotificationSender,
}

#[derive(Debug, Default)]
struct StoreState {
    slots: HashMap<Uuid, Timeslot>,
    appointments: HashMap<Uuid, Appointment>,
}

impl StoreState {
    fn slot_id_at(&self, counselor: UserId, date: NaiveDate, hour: u8) -> Option<Uuid> {
        self.slots
            .values()
            .find(|s| s.counselor_id == counselor && s.date == date && s.start_hour == hour)
            .map(|s| s.id)
    }

    fn ensure_slot(
        &mut self,
        counselor: UserId,
        date: NaiveDate,
        hour: u8,
        default_available: bool,
    ) -> Uuid {
        if let Some(id) = self.slot_id_at(counselor, date, hour) {
            return id;
        }
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.slots.insert(
            id,
            Timeslot {
                id,
                counselor_id: counselor,
                date,
                start_hour: hour,
                available: default_available,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    fn set_slot_availability(&mut self, slot_id: Uuid, available: bool) {
        if let Some(slot) = self.slots.get_mut(&slot_id) {
            slot.available = available;
            slot.updated_at = Utc::now();
        }
    }

    fn slot_available(&self, slot_id: Uuid) -> bool {
        self.slots.get(&slot_id).map(|s| s.available).unwrap_or(false)
    }

    /// Does the student already hold a pending/confirmed appointment at this
    /// (date, hour), with any counselor? `exclude` skips the appointment
    /// currently being moved so it does not conflict with itself.
    fn student_busy_at(
        &self,
        student: UserId,
        date: NaiveDate,
        hour: u8,
        exclude: Option<Uuid>,
    ) -> bool {
        self.appointments.values().any(|appointment| {
            appointment.student_id == student
                && exclude != Some(appointment.id)
                && appointment.status.is_active()
                && appointment
                    .timeslot_id
                    .and_then(|id| self.slots.get(&id))
                    .map(|slot| slot.date == date && slot.start_hour == hour)
                    .unwrap_or(false)
        })
    }
}

impl LocalStore {
    pub fn new(notifications: NotificationSender) -> Self {
        Self {
            state: Arc::new(Mutex::default()),
            notifications,
        }
    }

    fn apply_transition(
        &self,
        appointment_id: Uuid,
        actor: Principal,
        action: Action,
        new_slot: Option<(NaiveDate, u8)>,
    ) -> Result<Appointment, SchedulingError> {
        let updated = {
            let mut state = self.state.lock().unwrap();

            let current = state
                .appointments
                .get(&appointment_id)
                .cloned()
                .ok_or(SchedulingError::NotFound)?;
            lifecycle::check_actor(action, actor, current.student_id, current.counselor_id)?;
            let next = lifecycle::next_status(current.status, action)?;

            let mut updated = current.clone();
            match action {
                Action::Cancel => {
                    if let Some(slot_id) = current.timeslot_id {
                        state.set_slot_availability(slot_id, true);
                    }
                }
                Action::Reschedule => {
                    let (date, hour) = new_slot
                        .ok_or_else(|| SchedulingError::Storage("reschedule without target".into()))?;
                    if !is_canonical_hour(hour) {
                        return Err(SchedulingError::NotFound);
                    }
                    // The student keeps at most one active appointment per
                    // (date, hour); the moved appointment itself is exempt.
                    if state.student_busy_at(current.student_id, date, hour, Some(current.id)) {
                        return Err(SchedulingError::Conflict);
                    }
                    // Claim the new slot first; if it is taken the whole
                    // operation aborts and the old claim stays intact.
                    let new_id = state.ensure_slot(current.counselor_id, date, hour, true);
                    if !state.slot_available(new_id) {
                        return Err(SchedulingError::SlotUnavailable);
                    }
                    state.set_slot_availability(new_id, false);
                    if let Some(old_id) = current.timeslot_id {
                        state.set_slot_availability(old_id, true);
                    }
                    updated.timeslot_id = Some(new_id);
                }
                Action::Confirm | Action::Complete => {}
            }

            updated.status = next;
            updated.updated_at = Utc::now();
            state.appointments.insert(appointment_id, updated.clone());
            updated
        };

        match action {
            Action::Confirm => self
                .notifications
                .send_to_parties(EventKind::Confirmed, &updated),
            Action::Cancel => self
                .notifications
                .send_to_parties(EventKind::Cancelled, &updated),
            Action::Reschedule => self
                .notifications
                .send_to_parties(EventKind::Rescheduled, &updated),
            Action::Complete => {}
        }
        Ok(updated)
    }
}

impl SchedulingBackend for LocalStore {
    fn get_or_create_slot(
        &self,
        counselor: UserId,
        date: NaiveDate,
        hour: u8,
        default_available: bool,
    ) -> Result<Timeslot, SchedulingError> {
        if !is_canonical_hour(hour) {
            return Err(SchedulingError::NotFound);
        }
        let mut state = self.state.lock().unwrap();
        let id = state.ensure_slot(counselor, date, hour, default_available);
        state
            .slots
            .get(&id)
            .cloned()
            .ok_or_else(|| SchedulingError::Storage("slot vanished under lock".into()))
    }

    fn toggle_slot(&self, slot_id: Uuid, owner: UserId) -> Result<bool, SchedulingError> {
        let mut state = self.state.lock().unwrap();
        let slot = state.slots.get_mut(&slot_id).ok_or(SchedulingError::NotFound)?;
        if slot.counselor_id != owner {
            return Err(SchedulingError::NotFound);
        }
        slot.available = !slot.available;
        slot.updated_at = Utc::now();
        Ok(slot.available)
    }

    fn list_slots_for_date(
        &self,
        counselor: UserId,
        date: NaiveDate,
        baseline: bool,
    ) -> Result<Vec<SlotView>, SchedulingError> {
        let state = self.state.lock().unwrap();
        let persisted: Vec<Timeslot> = state
            .slots
            .values()
            .filter(|s| s.counselor_id == counselor && s.date == date)
            .cloned()
            .collect();
        Ok(merge_into_grid(&persisted, baseline))
    }

    fn book(
        &self,
        student: UserId,
        counselor: UserId,
        date: NaiveDate,
        hour: u8,
        program: String,
    ) -> Result<Appointment, SchedulingError> {
        if !is_canonical_hour(hour) {
            return Err(SchedulingError::NotFound);
        }

        let appointment = {
            let mut state = self.state.lock().unwrap();

            // Booking-path lazy creation defaults to open; a slot that was
            // never materialized is treated as bookable.
            let slot_id = state.ensure_slot(counselor, date, hour, true);
            if !state.slot_available(slot_id) {
                return Err(SchedulingError::SlotUnavailable);
            }
            if state.student_busy_at(student, date, hour, None) {
                return Err(SchedulingError::Conflict);
            }

            state.set_slot_availability(slot_id, false);
            let now = Utc::now();
            let appointment = Appointment {
                id: Uuid::new_v4(),
                student_id: student,
                counselor_id: counselor,
                timeslot_id: Some(slot_id),
                program,
                status: AppointmentStatus::Pending,
                created_at: now,
                updated_at: now,
            };
            state.appointments.insert(appointment.id, appointment.clone());
            appointment
        };

        self.notifications
            .send_to_parties(EventKind::Booked, &appointment);
        Ok(appointment)
    }

    fn confirm(
        &self,
        appointment_id: Uuid,
        actor: Principal,
    ) -> Result<Appointment, SchedulingError> {
        self.apply_transition(appointment_id, actor, Action::Confirm, None)
    }

    fn cancel(
        &self,
        appointment_id: Uuid,
        actor: Principal,
    ) -> Result<Appointment, SchedulingError> {
        self.apply_transition(appointment_id, actor, Action::Cancel, None)
    }

    fn complete(
        &self,
        appointment_id: Uuid,
        actor: Principal,
    ) -> Result<Appointment, SchedulingError> {
        self.apply_transition(appointment_id, actor, Action::Complete, None)
    }

    fn reschedule(
        &self,
        appointment_id: Uuid,
        actor: Principal,
        date: NaiveDate,
        hour: u8,
    ) -> Result<Appointment, SchedulingError> {
        self.apply_transition(appointment_id, actor, Action::Reschedule, Some((date, hour)))
    }

    fn appointments_for(&self, principal: Principal) -> Result<Vec<Appointment>, SchedulingError> {
        let state = self.state.lock().unwrap();
        let mut own: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|a| match principal.role {
                Role::Student => a.student_id == principal.id,
                Role::Counselor => a.counselor_id == principal.id,
            })
            .cloned()
            .collect();
        own.sort_unstable_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(own)
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new(NotificationSender::disconnected())
    }
}
