use std::collections::HashMap;

use tracing::debug;

use appointment_cell::models::Appointment;
use shared_backend::HospitalClient;
use shared_config::AppConfig;
use shared_models::error::UpstreamError;

use crate::models::{MedicalRecord, Medicine, Prescription};

pub struct RecordsService {
    client: HospitalClient,
}

impl RecordsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: HospitalClient::new(config),
        }
    }

    /// Appointment history joined with prescriptions; medicine lines get
    /// their display name from the catalog when the backend omits it.
    pub async fn medical_record(
        &self,
        patient_id: i64,
        auth_token: &str,
    ) -> Result<MedicalRecord, UpstreamError> {
        debug!("Building medical record for patient {}", patient_id);

        let appointments: Vec<Appointment> = self
            .client
            .get(
                &format!("/appointments/?patient_id={}", patient_id),
                Some(auth_token),
            )
            .await?;

        let prescriptions: Vec<Prescription> = self
            .client
            .get(
                &format!("/prescriptions/?patient_id={}", patient_id),
                Some(auth_token),
            )
            .await?;

        let medicines = self.list_medicines(auth_token).await?;
        let prescriptions = attach_medicine_names(prescriptions, &medicines);

        Ok(MedicalRecord {
            patient_id,
            appointments,
            prescriptions,
        })
    }

    pub async fn list_medicines(&self, auth_token: &str) -> Result<Vec<Medicine>, UpstreamError> {
        self.client.get("/medicines/", Some(auth_token)).await
    }
}

pub fn attach_medicine_names(
    mut prescriptions: Vec<Prescription>,
    medicines: &[Medicine],
) -> Vec<Prescription> {
    let by_id: HashMap<i64, &str> = medicines
        .iter()
        .map(|m| (m.id, m.name.as_str()))
        .collect();

    for prescription in &mut prescriptions {
        for item in &mut prescription.items {
            if item.medicine_name.is_none() {
                item.medicine_name = by_id.get(&item.medicine_id).map(|name| name.to_string());
            }
        }
    }

    prescriptions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn medicine(id: i64, name: &str) -> Medicine {
        Medicine {
            id,
            name: name.to_string(),
            unit: Some("tablet".to_string()),
            price: Some(1_200.0),
            description: None,
        }
    }

    fn prescription_with_items(items: Vec<crate::models::PrescriptionItem>) -> Prescription {
        Prescription {
            id: 7,
            patient_id: 42,
            doctor_id: 5,
            appointment_id: Some(901),
            note: None,
            items,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unnamed_lines_get_catalog_names() {
        let prescriptions = vec![prescription_with_items(vec![
            crate::models::PrescriptionItem {
                medicine_id: 1,
                medicine_name: None,
                quantity: 10,
                dosage: Some("2x daily".to_string()),
            },
            crate::models::PrescriptionItem {
                medicine_id: 99,
                medicine_name: None,
                quantity: 5,
                dosage: None,
            },
        ])];

        let joined = attach_medicine_names(prescriptions, &[medicine(1, "Paracetamol")]);
        assert_eq!(joined[0].items[0].medicine_name.as_deref(), Some("Paracetamol"));
        // Unknown medicine stays unnamed rather than failing the record.
        assert_eq!(joined[0].items[1].medicine_name, None);
    }

    #[test]
    fn existing_names_are_kept() {
        let prescriptions = vec![prescription_with_items(vec![
            crate::models::PrescriptionItem {
                medicine_id: 1,
                medicine_name: Some("Custom label".to_string()),
                quantity: 1,
                dosage: None,
            },
        ])];

        let joined = attach_medicine_names(prescriptions, &[medicine(1, "Paracetamol")]);
        assert_eq!(joined[0].items[0].medicine_name.as_deref(), Some("Custom label"));
    }
}
