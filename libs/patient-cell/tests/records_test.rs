use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::services::patient::PatientService;
use patient_cell::services::records::RecordsService;
use shared_utils::test_utils::TestConfig;

fn patient_row(id: i64, user_id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": user_id,
        "full_name": name,
        "email": "alice@example.com",
        "phone": null,
        "address": null,
        "date_of_birth": "1994-03-02",
        "gender": "F",
        "insurance_number": "INS-100",
        "avatar_url": null,
        "created_at": Utc::now().to_rfc3339(),
        "updated_at": Utc::now().to_rfc3339()
    })
}

#[tokio::test]
async fn medical_record_joins_prescriptions_with_the_catalog() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/"))
        .and(query_param("patient_id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 901,
            "patient_id": 42,
            "doctor_id": 5,
            "schedule_id": 11,
            "slot_start": "09:00:00",
            "slot_end": "09:30:00",
            "status": "D",
            "symptoms": "COUGH",
            "prescription_id": 7,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        }])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/prescriptions/"))
        .and(query_param("patient_id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 7,
            "patient_id": 42,
            "doctor_id": 5,
            "appointment_id": 901,
            "note": "after meals",
            "items": [
                { "medicine_id": 1, "medicine_name": null, "quantity": 10, "dosage": "2x daily" }
            ],
            "created_at": Utc::now().to_rfc3339()
        }])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/medicines/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Paracetamol", "unit": "tablet", "price": 1200.0, "description": null }
        ])))
        .mount(&mock_server)
        .await;

    let service = RecordsService::new(&TestConfig::with_api_url(&mock_server.uri()).to_app_config());
    let record = service.medical_record(42, "token").await.unwrap();

    assert_eq!(record.patient_id, 42);
    assert_eq!(record.appointments.len(), 1);
    assert_eq!(record.appointments[0].prescription_id, Some(7));
    assert_eq!(
        record.prescriptions[0].items[0].medicine_name.as_deref(),
        Some("Paracetamol")
    );
}

#[tokio::test]
async fn resolve_for_user_returns_the_first_match() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/patients/"))
        .and(query_param("user_id", "user-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([patient_row(42, "user-1", "Alice Tran")])),
        )
        .mount(&mock_server)
        .await;

    let service = PatientService::new(&TestConfig::with_api_url(&mock_server.uri()).to_app_config());
    let patient = service.resolve_for_user("user-1", "token").await.unwrap();

    assert_eq!(patient.unwrap().id, 42);
}

#[tokio::test]
async fn resolve_for_user_without_a_record_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/patients/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = PatientService::new(&TestConfig::with_api_url(&mock_server.uri()).to_app_config());
    let patient = service.resolve_for_user("user-1", "token").await.unwrap();

    assert!(patient.is_none());
}
