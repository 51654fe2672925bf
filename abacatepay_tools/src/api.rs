use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    data_objects::{ApiEnvelope, CreatePixQrCodeRequest},
    AbacatePayApiError,
    AbacatePayConfig,
    NewPixCharge,
    PixCharge,
    PixChargeStatus,
};

/// The two provider operations the gateway relies on. [`AbacatePayApi`] is the production implementation; tests
/// substitute a mock.
#[allow(async_fn_in_trait)]
pub trait PixGateway {
    /// Create a new PIX charge for the given amount and customer. The returned charge carries the renderable
    /// payment code and the provider-assigned id.
    async fn create_charge(&self, charge: NewPixCharge) -> Result<PixCharge, AbacatePayApiError>;

    /// Fetch the current status of an existing charge. Read-only and safe to call repeatedly.
    async fn get_charge(&self, charge_id: &str) -> Result<PixChargeStatus, AbacatePayApiError>;
}

#[derive(Clone)]
pub struct AbacatePayApi {
    config: AbacatePayConfig,
    client: Arc<Client>,
}

impl AbacatePayApi {
    pub fn new(config: AbacatePayConfig) -> Result<Self, AbacatePayApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.api_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| AbacatePayApiError::Initialization(e.to_string()))?;
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AbacatePayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, AbacatePayApiError> {
        let url = self.url(path);
        trace!("🥑️ Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| AbacatePayApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("🥑️ REST query successful. {}", response.status());
            let envelope =
                response.json::<ApiEnvelope<T>>().await.map_err(|e| AbacatePayApiError::JsonError(e.to_string()))?;
            envelope.into_data()
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| AbacatePayApiError::RestResponseError(e.to_string()))?;
            Err(AbacatePayApiError::QueryError { status, message })
        }
    }
}

impl PixGateway for AbacatePayApi {
    async fn create_charge(&self, charge: NewPixCharge) -> Result<PixCharge, AbacatePayApiError> {
        let external_id = charge.external_id.clone();
        let request = CreatePixQrCodeRequest::new(charge, self.config.expires_in);
        debug!("🥑️ Creating PIX charge of {} for order {external_id}", request.amount);
        let result: PixCharge = self.rest_query(Method::POST, "/pixQrCode/create", Some(request)).await?;
        info!("🥑️ PIX charge {} created for order {external_id}, expires at {}", result.id, result.expires_at);
        Ok(result)
    }

    async fn get_charge(&self, charge_id: &str) -> Result<PixChargeStatus, AbacatePayApiError> {
        if charge_id.is_empty() {
            return Err(AbacatePayApiError::RestRequestError("No charge id provided".to_string()));
        }
        let path = format!("/pixQrCode/{charge_id}");
        debug!("🥑️ Fetching status for PIX charge {charge_id}");
        let result: PixChargeStatus = self.rest_query(Method::GET, &path, None::<()>).await?;
        info!("🥑️ PIX charge {charge_id} is {}", result.status);
        Ok(result)
    }
}
