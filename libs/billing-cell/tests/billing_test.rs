use assert_matches::assert_matches;
use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use billing_cell::models::{ConfirmRequest, PaymentError};
use billing_cell::services::billing::BillingService;
use shared_utils::test_utils::TestConfig;

fn service_for(server_url: &str) -> BillingService {
    BillingService::new(&TestConfig::with_api_url(server_url).to_app_config())
}

fn appointment_row(id: i64, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "patient_id": 42,
        "doctor_id": 5,
        "schedule_id": 11,
        "slot_start": "09:00:00",
        "slot_end": "09:30:00",
        "status": status,
        "symptoms": "COUGH",
        "prescription_id": null,
        "created_at": Utc::now().to_rfc3339(),
        "updated_at": Utc::now().to_rfc3339()
    })
}

fn doctor_row(id: i64, price: f64) -> serde_json::Value {
    json!({
        "id": id,
        "full_name": "Dr. An Tran",
        "email": "antran@hospital.example",
        "specialization": "Cardiology",
        "department_id": 1,
        "department_name": "Cardiology",
        "price": price,
        "avatar_url": null,
        "bio": null,
        "is_available": true,
        "created_at": Utc::now().to_rfc3339(),
        "updated_at": Utc::now().to_rfc3339()
    })
}

fn patient_row(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": "user-1",
        "full_name": "Alice Tran",
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

fn bill_row(id: i64, order_code: i64) -> serde_json::Value {
    json!({
        "id": id,
        "appointment_id": 901,
        "patient_id": 42,
        "total_cost": 300000.0,
        "insurance_discount": 30000.0,
        "amount": 270000.0,
        "status": "U",
        "order_code": order_code,
        "created_at": Utc::now().to_rfc3339()
    })
}

#[tokio::test]
async fn confirm_and_pay_runs_the_whole_chain() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/901/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointment_row(901, "P")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/doctors/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doctor_row(5, 300_000.0)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/patients/42/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(patient_row(42)))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/appointments/901/"))
        .and(body_partial_json(json!({ "status": "C" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointment_row(901, "C")))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The bill mock only answers when the computed amounts arrive.
    Mock::given(method("POST"))
        .and(path("/bills/"))
        .and(body_partial_json(json!({
            "appointment_id": 901,
            "patient_id": 42,
            "total_cost": 300000.0,
            "insurance_discount": 30000.0,
            "amount": 270000.0,
            "status": "U"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(bill_row(123, 123045)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/transactions/create-payment/123/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": "https://gateway.example/pay/123045"
        })))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let redirect = service
        .confirm_and_pay(
            ConfirmRequest {
                appointment_id: 901,
                has_insurance: true,
            },
            "token",
        )
        .await
        .unwrap();

    assert_eq!(redirect.bill_id, 123);
    assert_eq!(redirect.order_code, Some(123045));
    assert_eq!(redirect.redirect_url, "https://gateway.example/pay/123045");
}

#[tokio::test]
async fn non_positive_price_stops_before_any_mutation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/901/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointment_row(901, "P")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/doctors/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doctor_row(5, 0.0)))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let err = service
        .confirm_and_pay(
            ConfirmRequest {
                appointment_id: 901,
                has_insurance: false,
            },
            "token",
        )
        .await
        .unwrap_err();

    assert_matches!(err, PaymentError::InvalidPrice);

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.method == wiremock::http::Method::GET));
}

#[tokio::test]
async fn already_confirmed_appointment_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/901/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointment_row(901, "C")))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let err = service
        .confirm_and_pay(
            ConfirmRequest {
                appointment_id: 901,
                has_insurance: false,
            },
            "token",
        )
        .await
        .unwrap_err();

    assert_matches!(err, PaymentError::NotAwaitingConfirmation);
}

#[tokio::test]
async fn partial_confirmation_load_still_renders() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments/901/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "not_found",
            "message": "Appointment not found"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/doctors/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doctor_row(5, 300_000.0)))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let context = service.load_confirmation(901, 5, "token").await;

    assert!(context.appointment.is_none());
    assert!(context.patient.is_none());
    assert_eq!(context.doctor.unwrap().id, 5);
    assert_eq!(context.load_error.as_deref(), Some("Appointment not found"));
}
