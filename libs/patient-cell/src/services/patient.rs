use serde_json::json;
use tracing::debug;

use shared_backend::HospitalClient;
use shared_config::AppConfig;
use shared_models::error::UpstreamError;

use crate::models::{Patient, PatientPage, PatientSearchQuery, UpdatePatientRequest};

const DEFAULT_PAGE_SIZE: usize = 10;

pub struct PatientService {
    client: HospitalClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: HospitalClient::new(config),
        }
    }

    /// The patient record backing the signed-in account, if one exists.
    pub async fn resolve_for_user(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Option<Patient>, UpstreamError> {
        debug!("Resolving patient record for user {}", user_id);

        let path = format!("/patients/?user_id={}", urlencoding::encode(user_id));
        let mut patients: Vec<Patient> = self.client.get(&path, Some(auth_token)).await?;

        Ok(if patients.is_empty() {
            None
        } else {
            Some(patients.remove(0))
        })
    }

    pub async fn get_patient(
        &self,
        patient_id: i64,
        auth_token: &str,
    ) -> Result<Patient, UpstreamError> {
        let path = format!("/patients/{}/", patient_id);
        self.client.get(&path, Some(auth_token)).await
    }

    /// PATCH only the fields the caller provided.
    pub async fn update_patient(
        &self,
        patient_id: i64,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, UpstreamError> {
        debug!("Updating patient {}", patient_id);

        let mut update_data = serde_json::Map::new();

        if let Some(full_name) = request.full_name {
            update_data.insert("full_name".to_string(), json!(full_name));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(date_of_birth) = request.date_of_birth {
            update_data.insert("date_of_birth".to_string(), json!(date_of_birth));
        }
        if let Some(gender) = request.gender {
            update_data.insert("gender".to_string(), json!(gender));
        }
        if let Some(insurance_number) = request.insurance_number {
            update_data.insert("insurance_number".to_string(), json!(insurance_number));
        }
        if let Some(avatar_url) = request.avatar_url {
            update_data.insert("avatar_url".to_string(), json!(avatar_url));
        }

        let path = format!("/patients/{}/", patient_id);
        self.client
            .patch(&path, Some(auth_token), serde_json::Value::Object(update_data))
            .await
    }

    /// Admin directory search over the fetched list.
    pub async fn search_patients(
        &self,
        query: PatientSearchQuery,
        auth_token: &str,
    ) -> Result<PatientPage, UpstreamError> {
        let patients: Vec<Patient> = self.client.get("/patients/", Some(auth_token)).await?;
        Ok(filter_patients(patients, &query))
    }
}

pub fn filter_patients(mut patients: Vec<Patient>, query: &PatientSearchQuery) -> PatientPage {
    if let Some(q) = query.q.as_deref() {
        let needle = q.to_lowercase();
        patients.retain(|p| p.full_name.to_lowercase().contains(&needle));
    }

    patients.sort_by(|a, b| a.full_name.cmp(&b.full_name));

    let total = patients.len();
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let patients = patients
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    PatientPage {
        patients,
        total,
        page,
        page_size,
    }
}
