use tracing::debug;

use shared_backend::HospitalClient;
use shared_config::AppConfig;
use shared_models::error::UpstreamError;

use crate::models::{Department, Doctor, DoctorPage, DoctorQuery, SortKey, SortOrder};

const DEFAULT_PAGE_SIZE: usize = 10;

pub struct DoctorDirectoryService {
    client: HospitalClient,
}

impl DoctorDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: HospitalClient::new(config),
        }
    }

    /// Fetch the full doctor list once, then filter/sort/paginate locally.
    pub async fn list_doctors(
        &self,
        query: DoctorQuery,
        auth_token: &str,
    ) -> Result<DoctorPage, UpstreamError> {
        debug!("Listing doctors with {:?}", query);

        let doctors: Vec<Doctor> = self.client.get("/doctors/", Some(auth_token)).await?;

        Ok(filter_doctors(doctors, &query))
    }

    pub async fn get_doctor(
        &self,
        doctor_id: i64,
        auth_token: &str,
    ) -> Result<Doctor, UpstreamError> {
        debug!("Fetching doctor {}", doctor_id);

        let path = format!("/doctors/{}/", doctor_id);
        self.client.get(&path, Some(auth_token)).await
    }

    pub async fn list_departments(
        &self,
        auth_token: &str,
    ) -> Result<Vec<Department>, UpstreamError> {
        self.client.get("/departments/", Some(auth_token)).await
    }
}

/// Apply the directory query to a fetched doctor list.
pub fn filter_doctors(mut doctors: Vec<Doctor>, query: &DoctorQuery) -> DoctorPage {
    if let Some(q) = query.q.as_deref() {
        let needle = q.to_lowercase();
        doctors.retain(|d| d.full_name.to_lowercase().contains(&needle));
    }

    if let Some(specialization) = query.specialization.as_deref() {
        doctors.retain(|d| d.specialization.eq_ignore_ascii_case(specialization));
    }

    if let Some(department_id) = query.department_id {
        doctors.retain(|d| d.department_id == department_id);
    }

    match query.sort_by.unwrap_or(SortKey::Name) {
        SortKey::Name => doctors.sort_by(|a, b| a.full_name.cmp(&b.full_name)),
        SortKey::Price => doctors.sort_by(|a, b| a.price.total_cmp(&b.price)),
    }

    if query.order == Some(SortOrder::Desc) {
        doctors.reverse();
    }

    let total = doctors.len();
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let doctors = doctors
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    DoctorPage {
        doctors,
        total,
        page,
        page_size,
    }
}
