use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::backend::SchedulingBackend;
use crate::error::SchedulingError;
use crate::types::{
    merge_into_grid, Appointment, AppointmentStatus, Principal, SlotView, Timeslot, UserId,
};

pub struct MockSchedulingBackendInner {
    pub failure: Mutex<Option<SchedulingError>>,
    pub calls_to_get_or_create_slot: AtomicU64,
    pub calls_to_toggle_slot: AtomicU64,
    pub calls_to_list_slots: AtomicU64,
    pub calls_to_book: AtomicU64,
    pub calls_to_confirm: AtomicU64,
    pub calls_to_cancel: AtomicU64,
    pub calls_to_complete: AtomicU64,
    pub calls_to_reschedule: AtomicU64,
    pub calls_to_appointments_for: AtomicU64,
    pub last_slot_request: Mutex<Option<(UserId, NaiveDate, u8, bool)>>,
    pub last_booking: Mutex<Option<(UserId, UserId, NaiveDate, u8, String)>>,
    pub appointments: Mutex<HashMap<Uuid, Appointment>>,
}

#[derive(Clone)]
pub struct MockSchedulingBackend(pub Arc<MockSchedulingBackendInner>);

impl MockSchedulingBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockSchedulingBackendInner {
            failure: Mutex::default(),
            calls_to_get_or_create_slot: AtomicU64::default(),
            calls_to_toggle_slot: AtomicU64::default(),
            calls_to_list_slots: AtomicU64::default(),
            calls_to_book: AtomicU64::default(),
            calls_to_confirm: AtomicU64::default(),
            calls_to_cancel: AtomicU64::default(),
            calls_to_complete: AtomicU64::default(),
            calls_to_reschedule: AtomicU64::default(),
            calls_to_appointments_for: AtomicU64::default(),
            last_slot_request: Mutex::default(),
            last_booking: Mutex::default(),
            appointments: Mutex::default(),
        }))
    }

    pub fn fail_with(&self, error: SchedulingError) {
        *self.0.failure.lock().unwrap() = Some(error);
    }

    fn check_failure(&self) -> Result<(), SchedulingError> {
        match self.0.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn canned_appointment(&self, status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            student_id: 1,
            counselor_id: 10,
            timeslot_id: Some(Uuid::new_v4()),
            program: "BS Psychology".into(),
            status,
            created_at: now,
            updated_at: now,
        }
    }
}

impl SchedulingBackend for MockSchedulingBackend {
    fn get_or_create_slot(
        &self,
        counselor: UserId,
        date: NaiveDate,
        hour: u8,
        default_available: bool,
    ) -> Result<Timeslot, SchedulingError> {
        self.0
            .calls_to_get_or_create_slot
            .fetch_add(1, Ordering::SeqCst);
        *self.0.last_slot_request.lock().unwrap() =
            Some((counselor, date, hour, default_available));
        self.check_failure()?;
        let now = Utc::now();
        Ok(Timeslot {
            id: Uuid::new_v4(),
            counselor_id: counselor,
            date,
            start_hour: hour,
            available: default_available,
            created_at: now,
            updated_at: now,
        })
    }

    fn toggle_slot(&self, _slot_id: Uuid, _owner: UserId) -> Result<bool, SchedulingError> {
        self.0.calls_to_toggle_slot.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(true)
    }

    fn list_slots_for_date(
        &self,
        _counselor: UserId,
        _date: NaiveDate,
        baseline: bool,
    ) -> Result<Vec<SlotView>, SchedulingError> {
        self.0.calls_to_list_slots.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(merge_into_grid(&[], baseline))
    }

    fn book(
        &self,
        student: UserId,
        counselor: UserId,
        date: NaiveDate,
        hour: u8,
        program: String,
    ) -> Result<Appointment, SchedulingError> {
        self.0.calls_to_book.fetch_add(1, Ordering::SeqCst);
        *self.0.last_booking.lock().unwrap() =
            Some((student, counselor, date, hour, program.clone()));
        self.check_failure()?;
        let now = Utc::now();
        Ok(Appointment {
            id: Uuid::new_v4(),
            student_id: student,
            counselor_id: counselor,
            timeslot_id: Some(Uuid::new_v4()),
            program,
            status: AppointmentStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    fn confirm(
        &self,
        _appointment_id: Uuid,
        _actor: Principal,
    ) -> Result<Appointment, SchedulingError> {
        self.0.calls_to_confirm.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.canned_appointment(AppointmentStatus::Confirmed))
    }

    fn cancel(
        &self,
        _appointment_id: Uuid,
        _actor: Principal,
    ) -> Result<Appointment, SchedulingError> {
        self.0.calls_to_cancel.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.canned_appointment(AppointmentStatus::Cancelled))
    }

    fn complete(
        &self,
        _appointment_id: Uuid,
        _actor: Principal,
    ) -> Result<Appointment, SchedulingError> {
        self.0.calls_to_complete.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.canned_appointment(AppointmentStatus::Completed))
    }

    fn reschedule(
        &self,
        _appointment_id: Uuid,
        _actor: Principal,
        _date: NaiveDate,
        _hour: u8,
    ) -> Result<Appointment, SchedulingError> {
        self.0.calls_to_reschedule.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.canned_appointment(AppointmentStatus::Pending))
    }

    fn appointments_for(&self, _principal: Principal) -> Result<Vec<Appointment>, SchedulingError> {
        self.0
            .calls_to_appointments_for
            .fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.0.appointments.lock().unwrap().values().cloned().collect())
    }
}
