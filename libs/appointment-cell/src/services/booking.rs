use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde_json::{json, Value};
use tracing::{debug, info};

use doctor_cell::services::schedule::{find_for_shift, ScheduleService};
use shared_backend::HospitalClient;
use shared_config::AppConfig;
use shared_models::auth::User;

use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, BookingConfirmation, BookingError,
};
use crate::services::lifecycle::AppointmentLifecycle;

/// Slot granularity is owned by the backend; the portal only needs it to
/// compute the end of the slot the patient picked.
const SLOT_MINUTES: i64 = 30;
const TIME_FORMAT: &str = "%H:%M:%S";

pub struct BookingService {
    client: HospitalClient,
    schedules: ScheduleService,
    lifecycle: AppointmentLifecycle,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: HospitalClient::new(config),
            schedules: ScheduleService::new(config),
            lifecycle: AppointmentLifecycle::new(),
        }
    }

    /// Create a pending appointment. Preconditions are checked in order and
    /// a failed one aborts the flow; nothing partial ever goes upstream.
    pub async fn book(
        &self,
        user: &User,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<BookingConfirmation, BookingError> {
        info!(
            "Booking appointment for user {} with doctor {}",
            user.id, request.doctor_id
        );

        // Local checks first: no network traffic until they hold.
        let slot_start = request.slot_start.ok_or(BookingError::NoSlotSelected)?;
        if !is_future(request.date, slot_start, Utc::now()) {
            return Err(BookingError::PastSlot);
        }

        let patient_id = self.resolve_patient_id(&user.id, auth_token).await?;

        let schedules = self
            .schedules
            .schedules_for(request.doctor_id, request.date, auth_token)
            .await?;
        let schedule =
            find_for_shift(&schedules, request.shift).ok_or(BookingError::NoSchedule {
                doctor_id: request.doctor_id,
                date: request.date,
                shift: request.shift,
            })?;

        let slot_end = slot_end_after(slot_start);
        let symptoms = compose_symptoms(&request.symptoms, request.note.as_deref());

        let appointment: Appointment = self
            .client
            .post(
                "/appointments/",
                Some(auth_token),
                json!({
                    "doctor": request.doctor_id,
                    "patient": patient_id,
                    "schedule": schedule.id,
                    "slot_start": slot_start.format(TIME_FORMAT).to_string(),
                    "slot_end": slot_end.format(TIME_FORMAT).to_string(),
                    "symptoms": symptoms,
                    "status": AppointmentStatus::Pending,
                }),
            )
            .await?;

        info!(
            "Appointment {} booked for patient {}",
            appointment.id, patient_id
        );

        Ok(BookingConfirmation {
            appointment_id: appointment.id,
            doctor_id: request.doctor_id,
            work_date: request.date,
        })
    }

    pub async fn get_appointment(
        &self,
        appointment_id: i64,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        debug!("Fetching appointment {}", appointment_id);

        let path = format!("/appointments/{}/", appointment_id);
        Ok(self.client.get(&path, Some(auth_token)).await?)
    }

    /// Status PATCH, validated against the client-side state machine before
    /// anything is sent. The backend remains the final authority.
    pub async fn update_status(
        &self,
        appointment_id: i64,
        next: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;
        self.lifecycle.validate_transition(current.status, next)?;

        let path = format!("/appointments/{}/", appointment_id);
        Ok(self
            .client
            .patch(&path, Some(auth_token), json!({ "status": next }))
            .await?)
    }

    async fn resolve_patient_id(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<i64, BookingError> {
        let path = format!("/patients/?user_id={}", urlencoding::encode(user_id));
        let patients: Vec<Value> = self.client.get(&path, Some(auth_token)).await?;

        patients
            .first()
            .and_then(|p| p["id"].as_i64())
            .ok_or(BookingError::PatientNotResolved)
    }
}

pub fn slot_end_after(start: NaiveTime) -> NaiveTime {
    start + Duration::minutes(SLOT_MINUTES)
}

pub fn is_future(date: NaiveDate, slot_start: NaiveTime, now: DateTime<Utc>) -> bool {
    date.and_time(slot_start) > now.naive_utc()
}

/// Selected symptom codes joined, with the free-text note as a suffix.
pub fn compose_symptoms(codes: &[String], note: Option<&str>) -> String {
    let mut symptoms = codes.join(", ");

    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        if symptoms.is_empty() {
            symptoms = format!("Note: {}", note);
        } else {
            symptoms.push_str("; Note: ");
            symptoms.push_str(note);
        }
    }

    symptoms
}
