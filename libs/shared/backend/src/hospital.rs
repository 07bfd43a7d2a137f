use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::error::UpstreamError;

/// Thin client for the hospital REST backend. One instance per service;
/// resource paths are owned by the calling cell.
pub struct HospitalClient {
    client: Client,
    base_url: String,
}

impl HospitalClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.hospital_api_url.trim_end_matches('/').to_string(),
        }
    }

    fn headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| UpstreamError::transport("invalid characters in auth token"))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let headers = self.headers(auth_token)?;

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req
            .send()
            .await
            .map_err(|e| UpstreamError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Hospital API error ({}): {}", status, error_text);
            return Err(UpstreamError::from_body(status.as_u16(), &error_text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::transport(format!("invalid response body: {}", e)))
    }

    pub async fn get<T>(&self, path: &str, auth_token: Option<&str>) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, path, auth_token, None).await
    }

    pub async fn post<T>(
        &self,
        path: &str,
        auth_token: Option<&str>,
        body: Value,
    ) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, auth_token, Some(body)).await
    }

    pub async fn patch<T>(
        &self,
        path: &str,
        auth_token: Option<&str>,
        body: Value,
    ) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, auth_token, Some(body)).await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(url: &str) -> AppConfig {
        AppConfig {
            hospital_api_url: url.to_string(),
            hospital_jwt_secret: "secret".to_string(),
            payment_gateway_name: "payos".to_string(),
        }
    }

    #[tokio::test]
    async fn bearer_token_is_forwarded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/doctors/"))
            .and(header("Authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let client = HospitalClient::new(&config_for(&mock_server.uri()));
        let result: Vec<Value> = client.get("/doctors/", Some("token-1")).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn error_envelope_becomes_a_typed_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/doctors/99/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": "not_found",
                "message": "Doctor not found"
            })))
            .mount(&mock_server)
            .await;

        let client = HospitalClient::new(&config_for(&mock_server.uri()));
        let err = client
            .get::<Value>("/doctors/99/", None)
            .await
            .unwrap_err();

        assert_eq!(err.status, 404);
        assert_eq!(err.code.as_deref(), Some("not_found"));
        assert_eq!(err.message, "Doctor not found");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let client = HospitalClient::new(&config_for("http://127.0.0.1:1"));
        let err = client.get::<Value>("/doctors/", None).await.unwrap_err();
        assert_eq!(err.status, 0);
    }

    #[test]
    fn trailing_slash_in_base_url_is_trimmed() {
        let client = HospitalClient::new(&config_for("http://localhost:8000/"));
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
