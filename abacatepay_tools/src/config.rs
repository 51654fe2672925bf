use std::time::Duration;

use log::*;
use ppg_common::Secret;

pub const DEFAULT_ABACATEPAY_BASE_URL: &str = "https://api.abacatepay.com/v1";
const DEFAULT_PIX_EXPIRES_IN: u32 = 3600;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AbacatePayConfig {
    pub base_url: String,
    pub api_key: Secret<String>,
    /// The lifetime of newly created PIX charges, in seconds.
    pub expires_in: u32,
    /// Timeout applied to every outbound call to the provider.
    pub timeout: Duration,
}

impl Default for AbacatePayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ABACATEPAY_BASE_URL.to_string(),
            api_key: Secret::default(),
            expires_in: DEFAULT_PIX_EXPIRES_IN,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AbacatePayConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("PPG_ABACATEPAY_BASE_URL").unwrap_or_else(|_| {
            info!("PPG_ABACATEPAY_BASE_URL not set, using the production API at {DEFAULT_ABACATEPAY_BASE_URL}");
            DEFAULT_ABACATEPAY_BASE_URL.to_string()
        });
        let api_key = Secret::new(std::env::var("PPG_ABACATEPAY_API_KEY").unwrap_or_else(|_| {
            error!("PPG_ABACATEPAY_API_KEY not set. Calls to AbacatePay will be rejected until it is configured.");
            String::default()
        }));
        let expires_in = std::env::var("PPG_PIX_EXPIRES_IN")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| warn!("Invalid value for PPG_PIX_EXPIRES_IN: {e}. Using the default."))
                    .ok()
            })
            .unwrap_or(DEFAULT_PIX_EXPIRES_IN);
        let timeout = std::env::var("PPG_ABACATEPAY_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid value for PPG_ABACATEPAY_TIMEOUT: {e}. Using the default."))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Self { base_url, api_key, expires_in, timeout }
    }
}
