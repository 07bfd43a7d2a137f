use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use doctor_cell::models::Shift;
use shared_models::error::{AppError, UpstreamError};

/// Appointment states as the backend encodes them, single letters on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(rename = "P")]
    Pending,
    #[serde(rename = "C")]
    Confirmed,
    #[serde(rename = "I")]
    InProgress,
    #[serde(rename = "D")]
    Completed,
    #[serde(rename = "X")]
    Cancelled,
    #[serde(rename = "N")]
    NoShow,
}

impl AppointmentStatus {
    pub fn code(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "P",
            AppointmentStatus::Confirmed => "C",
            AppointmentStatus::InProgress => "I",
            AppointmentStatus::Completed => "D",
            AppointmentStatus::Cancelled => "X",
            AppointmentStatus::NoShow => "N",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub schedule_id: i64,
    pub slot_start: NaiveTime,
    pub slot_end: NaiveTime,
    pub status: AppointmentStatus,
    pub symptoms: String,
    pub prescription_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Slot row exactly as the backend returns it; granularity is owned there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotInfo {
    pub slot_start: NaiveTime,
    pub slot_end: NaiveTime,
    pub available: bool,
}

/// Slot as presented: backend availability plus the local past-time guard.
/// Past slots stay in the list, only tagged not selectable.
#[derive(Debug, Clone, Serialize)]
pub struct SlotMark {
    pub slot_start: NaiveTime,
    pub slot_end: NaiveTime,
    pub available: bool,
    pub selectable: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DayAvailability {
    pub morning: Vec<SlotMark>,
    pub afternoon: Vec<SlotMark>,
    pub selection: Option<NaiveTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub shift: Shift,
    pub selected: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub shift: Shift,
    pub slot_start: Option<NaiveTime>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub note: Option<String>,
}

/// The confirmation-route parameters handed back after a successful booking.
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub appointment_id: i64,
    pub doctor_id: i64,
    pub work_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("No time slot selected")]
    NoSlotSelected,

    #[error("Selected time is already in the past")]
    PastSlot,

    #[error("No patient record for the current account")]
    PatientNotResolved,

    #[error("No schedule for doctor {doctor_id} on {date} shift {shift}")]
    NoSchedule {
        doctor_id: i64,
        date: NaiveDate,
        shift: Shift,
    },

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Upstream(e) => AppError::from(e),
            BookingError::PatientNotResolved => AppError::NotFound(
                "No patient record for the current account".to_string(),
            ),
            BookingError::InvalidTransition { from, to } => AppError::Conflict(format!(
                "Appointment cannot move from {} to {}",
                from, to
            )),
            other => AppError::Validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_letters_round_trip() {
        let parsed: AppointmentStatus = serde_json::from_str("\"P\"").unwrap();
        assert_eq!(parsed, AppointmentStatus::Pending);
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Completed).unwrap(),
            "\"D\""
        );
        assert_eq!(AppointmentStatus::NoShow.code(), "N");
    }

    #[test]
    fn unknown_status_letter_is_rejected() {
        assert!(serde_json::from_str::<AppointmentStatus>("\"Z\"").is_err());
    }
}
