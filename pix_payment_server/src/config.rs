use std::env;

use abacatepay_tools::AbacatePayConfig;
use chrono::Duration;
use log::*;
use pix_payment_engine::db_url;
use ppg_common::{helpers::parse_boolean_flag, Secret};

const DEFAULT_PPG_HOST: &str = "127.0.0.1";
const DEFAULT_PPG_PORT: u16 = 8380;
const DEFAULT_UNPAID_ORDER_TIMEOUT: Duration = Duration::hours(48);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The shared secret AbacatePay appends to webhook calls as `?webhookSecret=...`. Unset means the webhook
    /// endpoint rejects everything (fail closed).
    pub webhook_secret: Option<Secret<String>>,
    /// The shared key for the back-office order endpoints, checked against the `X-Api-Key` header. Unset means the
    /// admin endpoints reject everything (fail closed).
    pub admin_api_key: Option<Secret<String>>,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// The time before an unpaid pending order is considered abandoned and marked as expired.
    pub unpaid_order_timeout: Duration,
    /// AbacatePay client configuration
    pub abacatepay: AbacatePayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PPG_HOST.to_string(),
            port: DEFAULT_PPG_PORT,
            database_url: String::default(),
            webhook_secret: None,
            admin_api_key: None,
            use_x_forwarded_for: false,
            use_forwarded: false,
            unpaid_order_timeout: DEFAULT_UNPAID_ORDER_TIMEOUT,
            abacatepay: AbacatePayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PPG_HOST").ok().unwrap_or_else(|| DEFAULT_PPG_HOST.into());
        let port = env::var("PPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PPG_PORT. {e} Using the default, {DEFAULT_PPG_PORT}, instead."
                    );
                    DEFAULT_PPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PPG_PORT);
        let database_url = db_url();
        let webhook_secret = env::var("PPG_WEBHOOK_SECRET").ok().map(Secret::new);
        if webhook_secret.is_none() {
            warn!(
                "🪛️ PPG_WEBHOOK_SECRET is not set. The payment provider webhook endpoint will reject every call \
                 until it is configured."
            );
        }
        let admin_api_key = env::var("PPG_ADMIN_API_KEY").ok().map(Secret::new);
        if admin_api_key.is_none() {
            warn!(
                "🪛️ PPG_ADMIN_API_KEY is not set. The back-office order endpoints will reject every call until it \
                 is configured."
            );
        }
        let use_x_forwarded_for = parse_boolean_flag(env::var("PPG_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("PPG_USE_FORWARDED").ok(), false);
        let unpaid_order_timeout = env::var("PPG_UNPAID_ORDER_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| {
                        error!("🪛️ {s} is not a valid number of hours for PPG_UNPAID_ORDER_TIMEOUT. {e}");
                        e
                    })
                    .ok()
            })
            .map(Duration::hours)
            .unwrap_or_else(|| {
                info!(
                    "🪛️ PPG_UNPAID_ORDER_TIMEOUT is not set. Using the default of {}h.",
                    DEFAULT_UNPAID_ORDER_TIMEOUT.num_hours()
                );
                DEFAULT_UNPAID_ORDER_TIMEOUT
            });
        let abacatepay = AbacatePayConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            webhook_secret,
            admin_api_key,
            use_x_forwarded_for,
            use_forwarded,
            unpaid_order_timeout,
            abacatepay,
        }
    }
}
