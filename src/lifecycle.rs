//! Appointment state machine. Pure functions so both backends can run the
//! same guards inside their own transactional boundary.

use crate::error::SchedulingError;
use crate::types::{AppointmentStatus, Principal, Role, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Confirm,
    Cancel,
    Complete,
    Reschedule,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
            Self::Reschedule => "reschedule",
        }
    }
}

/// Transition table. Rescheduling resets a confirmed appointment back to
/// pending. Everything not listed here is an invalid transition.
pub fn next_status(
    current: AppointmentStatus,
    action: Action,
) -> Result<AppointmentStatus, SchedulingError> {
    use AppointmentStatus::*;

    match (current, action) {
        (Pending, Action::Confirm) => Ok(Confirmed),
        (Pending | Confirmed, Action::Cancel) => Ok(Cancelled),
        (Confirmed, Action::Complete) => Ok(Completed),
        (Pending | Confirmed, Action::Reschedule) => Ok(Pending),
        (from, action) => Err(SchedulingError::InvalidTransition {
            from,
            action: action.as_str(),
        }),
    }
}

/// Cancelling is open to either party; everything else is counselor-only.
/// A principal with no claim on the appointment gets NotFound, the same
/// answer as for an id that does not exist.
pub fn check_actor(
    action: Action,
    actor: Principal,
    student_id: UserId,
    counselor_id: UserId,
) -> Result<(), SchedulingError> {
    let allowed = match action {
        Action::Cancel => {
            (actor.role == Role::Student && actor.id == student_id)
                || (actor.role == Role::Counselor && actor.id == counselor_id)
        }
        Action::Confirm | Action::Complete | Action::Reschedule => {
            actor.role == Role::Counselor && actor.id == counselor_id
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(SchedulingError::NotFound)
    }
}
