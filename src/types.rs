use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = i64;

/// The fixed daily grid of bookable hours. The lunch hour (12) is excluded.
pub const CANONICAL_HOURS: [u8; 8] = [8, 9, 10, 11, 13, 14, 15, 16];

pub fn is_canonical_hour(hour: u8) -> bool {
    CANONICAL_HOURS.contains(&hour)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Counselor,
}

/// Authenticated caller as supplied by the external auth layer. The role is
/// fixed per principal; an account acting in both roles is two principals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeslot {
    pub id: Uuid,
    pub counselor_id: UserId,
    pub date: NaiveDate,
    pub start_hour: u8,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of the 8-hour availability grid. Hours without a persisted
/// timeslot carry no id and show the caller-supplied baseline availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotView {
    pub slot_id: Option<Uuid>,
    pub start_hour: u8,
    pub available: bool,
}

/// Merges persisted slots of one (counselor, date) into the canonical grid,
/// ordered by hour.
pub fn merge_into_grid(persisted: &[Timeslot], baseline: bool) -> Vec<SlotView> {
    CANONICAL_HOURS
        .iter()
        .map(|&hour| match persisted.iter().find(|s| s.start_hour == hour) {
            Some(slot) => SlotView {
                slot_id: Some(slot.id),
                start_hour: hour,
                available: slot.available,
            },
            None => SlotView {
                slot_id: None,
                start_hour: hour,
                available: baseline,
            },
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Active appointments are the ones that hold a slot claim.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub student_id: UserId,
    pub counselor_id: UserId,
    pub timeslot_id: Option<Uuid>,
    pub program: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
