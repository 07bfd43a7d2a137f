use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub hospital_api_url: String,
    pub hospital_jwt_secret: String,
    pub payment_gateway_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            hospital_api_url: env::var("HOSPITAL_API_URL")
                .unwrap_or_else(|_| {
                    warn!("HOSPITAL_API_URL not set, using empty value");
                    String::new()
                }),
            hospital_jwt_secret: env::var("HOSPITAL_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("HOSPITAL_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            payment_gateway_name: env::var("PAYMENT_GATEWAY_NAME")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_GATEWAY_NAME not set, using default");
                    "payos".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.hospital_api_url.is_empty()
            && !self.hospital_jwt_secret.is_empty()
    }
}
