use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use appointment_cell::models::{Appointment, BookingError};
use doctor_cell::models::Doctor;
use patient_cell::models::Patient;
use shared_models::error::{AppError, UpstreamError};

/// Bill states as the backend encodes them: U = unpaid, S = settled,
/// C = cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillStatus {
    #[serde(rename = "U")]
    Unpaid,
    #[serde(rename = "S")]
    Paid,
    #[serde(rename = "C")]
    Cancelled,
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillStatus::Unpaid => write!(f, "U"),
            BillStatus::Paid => write!(f, "S"),
            BillStatus::Cancelled => write!(f, "C"),
        }
    }
}

/// Creation responses carry `order_code` next to the id, so nothing on the
/// portal ever has to decode one from the other outside the gateway return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: i64,
    pub appointment_id: i64,
    pub patient_id: i64,
    pub total_cost: f64,
    pub insurance_discount: f64,
    pub amount: f64,
    pub status: BillStatus,
    pub order_code: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmRequest {
    pub appointment_id: i64,
    #[serde(default)]
    pub has_insurance: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationQuery {
    pub doctor_id: i64,
}

/// View model for the confirmation page. Partial loads render with `None`
/// stand-ins and the first recorded error instead of failing the view.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationContext {
    pub appointment: Option<Appointment>,
    pub doctor: Option<Doctor>,
    pub patient: Option<Patient>,
    pub load_error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentLinkResponse {
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRedirect {
    pub bill_id: i64,
    pub order_code: Option<i64>,
    pub redirect_url: String,
}

/// Query parameters the gateway appends to its return URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentReturnQuery {
    pub status: Option<String>,
    pub code: Option<String>,
    pub id: Option<String>,
    pub cancel: Option<String>,
    #[serde(rename = "orderCode")]
    pub order_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Success,
    Cancelled,
    Pending,
}

/// Bill plus appointment snapshot served by the payment-info endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInfo {
    pub bill: Bill,
    pub appointment: Appointment,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentReturnOutcome {
    pub outcome: PaymentOutcome,
    pub bill_id: i64,
    pub order_code: i64,
    pub acknowledged: bool,
    pub bill: Bill,
    pub appointment: Appointment,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Appointment is not awaiting confirmation")]
    NotAwaitingConfirmation,

    #[error("Doctor price must be a positive amount")]
    InvalidPrice,

    #[error("No bill can be derived from order code \"{0}\"")]
    NoBillId(String),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NotAwaitingConfirmation => {
                AppError::Conflict("Appointment is not awaiting confirmation".to_string())
            }
            PaymentError::InvalidPrice => {
                AppError::Validation("Doctor price must be a positive amount".to_string())
            }
            PaymentError::NoBillId(raw) => AppError::BadRequest(format!(
                "No bill can be derived from order code \"{}\"",
                raw
            )),
            PaymentError::Booking(e) => AppError::from(e),
            PaymentError::Upstream(e) => AppError::from(e),
        }
    }
}
