use serde_json::json;
use tracing::{info, warn};

use appointment_cell::models::AppointmentStatus;
use appointment_cell::services::booking::BookingService;
use doctor_cell::services::directory::DoctorDirectoryService;
use patient_cell::services::patient::PatientService;
use shared_backend::HospitalClient;
use shared_config::AppConfig;

use crate::models::{
    Bill, BillStatus, ConfirmRequest, ConfirmationContext, PaymentError, PaymentLinkResponse,
    PaymentRedirect,
};

/// Flat insurance discount applied at bill creation.
pub const INSURANCE_DISCOUNT_RATE: f64 = 0.10;

pub struct BillingService {
    client: HospitalClient,
    appointments: BookingService,
    doctors: DoctorDirectoryService,
    patients: PatientService,
    gateway_name: String,
}

impl BillingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: HospitalClient::new(config),
            appointments: BookingService::new(config),
            doctors: DoctorDirectoryService::new(config),
            patients: PatientService::new(config),
            gateway_name: config.payment_gateway_name.clone(),
        }
    }

    /// Load everything the confirmation page shows. Each failed fetch is
    /// replaced by a placeholder and the first error message is kept, so
    /// the page still renders.
    pub async fn load_confirmation(
        &self,
        appointment_id: i64,
        doctor_id: i64,
        auth_token: &str,
    ) -> ConfirmationContext {
        let mut load_error: Option<String> = None;

        let appointment = match self
            .appointments
            .get_appointment(appointment_id, auth_token)
            .await
        {
            Ok(appointment) => Some(appointment),
            Err(e) => {
                warn!("Confirmation load failed for appointment {}: {}", appointment_id, e);
                load_error.get_or_insert(e.to_string());
                None
            }
        };

        let doctor = match self.doctors.get_doctor(doctor_id, auth_token).await {
            Ok(doctor) => Some(doctor),
            Err(e) => {
                warn!("Confirmation load failed for doctor {}: {}", doctor_id, e);
                load_error.get_or_insert(e.to_string());
                None
            }
        };

        let patient = match appointment.as_ref() {
            Some(appointment) => {
                match self
                    .patients
                    .get_patient(appointment.patient_id, auth_token)
                    .await
                {
                    Ok(patient) => Some(patient),
                    Err(e) => {
                        warn!(
                            "Confirmation load failed for patient {}: {}",
                            appointment.patient_id, e
                        );
                        load_error.get_or_insert(e.to_string());
                        None
                    }
                }
            }
            None => None,
        };

        ConfirmationContext {
            appointment,
            doctor,
            patient,
            load_error,
        }
    }

    /// Confirm the appointment, create its bill, and hand back the gateway
    /// redirect. The appointment is confirmed first; a later billing failure
    /// leaves it confirmed and surfaces the error, no rollback is attempted.
    pub async fn confirm_and_pay(
        &self,
        request: ConfirmRequest,
        auth_token: &str,
    ) -> Result<PaymentRedirect, PaymentError> {
        info!("Confirming appointment {} for payment", request.appointment_id);

        let appointment = self
            .appointments
            .get_appointment(request.appointment_id, auth_token)
            .await?;
        if appointment.status != AppointmentStatus::Pending {
            return Err(PaymentError::NotAwaitingConfirmation);
        }

        let doctor = self
            .doctors
            .get_doctor(appointment.doctor_id, auth_token)
            .await?;
        if doctor.price <= 0.0 {
            return Err(PaymentError::InvalidPrice);
        }

        let patient = self
            .patients
            .get_patient(appointment.patient_id, auth_token)
            .await?;

        self.appointments
            .update_status(appointment.id, AppointmentStatus::Confirmed, auth_token)
            .await?;

        let (total_cost, insurance_discount, amount) =
            bill_amounts(doctor.price, request.has_insurance);

        let bill: Bill = self
            .client
            .post(
                "/bills/",
                Some(auth_token),
                json!({
                    "appointment_id": appointment.id,
                    "patient_id": patient.id,
                    "total_cost": total_cost,
                    "insurance_discount": insurance_discount,
                    "amount": amount,
                    "status": BillStatus::Unpaid,
                    "bill_details": [{
                        "item_name": format!("Consultation with {}", doctor.full_name),
                        "item_price": total_cost
                    }]
                }),
            )
            .await?;

        let link: PaymentLinkResponse = self
            .client
            .post(
                &format!("/transactions/create-payment/{}/", bill.id),
                Some(auth_token),
                json!({}),
            )
            .await?;

        info!(
            "Bill {} created for appointment {}, redirecting to {}",
            bill.id, appointment.id, self.gateway_name
        );

        Ok(PaymentRedirect {
            bill_id: bill.id,
            order_code: bill.order_code,
            redirect_url: link.data,
        })
    }

    pub async fn get_bill(&self, bill_id: i64, auth_token: &str) -> Result<Bill, PaymentError> {
        let path = format!("/bills/{}/", bill_id);
        Ok(self.client.get(&path, Some(auth_token)).await?)
    }
}

/// Total, discount, and payable amount for a bill.
pub fn bill_amounts(price: f64, has_insurance: bool) -> (f64, f64, f64) {
    let discount = if has_insurance {
        price * INSURANCE_DISCOUNT_RATE
    } else {
        0.0
    };

    (price, discount, price - discount)
}
