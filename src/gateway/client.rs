//! AgriNode gateway HTTP client

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::GatewayConfig;
use crate::error::BridgeError;
use crate::models::{self, Envelope, Reading, SensorDescriptor};

/// Read side of the gateway used by the coordinator.
///
/// Expected failures (transport errors, timeouts, non-200 statuses, envelopes
/// with `success = false`) are logged and come back as empty results. Only
/// responses that cannot be interpreted at all surface as `Err`.
#[async_trait]
pub trait SensorGateway: Send + Sync {
    async fn list_sensors(&self) -> Result<BTreeMap<String, SensorDescriptor>, BridgeError>;

    async fn get_latest_reading(&self, sensor_id: &str) -> Result<Option<Reading>, BridgeError>;
}

/// Authorization header flavour.
///
/// The setup probe and the polling endpoints have always used different
/// schemes against deployed gateways, so both are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    ApiKey,
    Bearer,
}

impl AuthScheme {
    pub fn header_value(&self, key: &str) -> String {
        match self {
            AuthScheme::ApiKey => format!("ApiKey {}", key),
            AuthScheme::Bearer => format!("Bearer {}", key),
        }
    }
}

/// Identity of a validated gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub title: String,
    pub unique_id: String,
}

pub struct GatewayClient {
    host: String,
    base_url: Url,
    api_key: Option<String>,
    http_client: Client,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, BridgeError> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            host: config.host.trim().to_string(),
            base_url: config.base_url()?,
            api_key: config.api_key().map(str::to_string),
            http_client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BridgeError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BridgeError::Config(format!("{} cannot be a base URL", self.base_url)))?
            .clear()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url, scheme: AuthScheme) -> reqwest::RequestBuilder {
        let request = self
            .http_client
            .get(url)
            .header("Content-Type", "application/json");

        match &self.api_key {
            Some(key) => request.header("Authorization", scheme.header_value(key)),
            None => request,
        }
    }

    /// Probe `GET /status`; anything but HTTP 200 means the gateway is unusable
    pub async fn check_status(&self) -> Result<EntryInfo, BridgeError> {
        let url = self.endpoint(&["status"])?;

        let resp = self.get(url, AuthScheme::Bearer).send().await.map_err(|e| {
            tracing::error!("[Gateway] Client error: {}", e);
            BridgeError::CannotConnect(e.to_string())
        })?;

        if resp.status() != StatusCode::OK {
            return Err(BridgeError::CannotConnect(format!(
                "Error connecting to API: {}",
                resp.status().as_u16()
            )));
        }

        Ok(EntryInfo {
            title: format!("AgriNode Gateway ({})", self.host),
            unique_id: format!("agrinode_{}", self.host),
        })
    }

    /// GET an envelope endpoint and return its payload. `None` covers every
    /// failure that degrades to "no data".
    async fn fetch_payload(&self, url: Url, what: &str) -> Option<Value> {
        let resp = match self.get(url, AuthScheme::ApiKey).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("[Gateway] Error fetching {}: {}", what, e);
                return None;
            }
        };

        if resp.status() != StatusCode::OK {
            tracing::error!("[Gateway] Error fetching {}: {}", what, resp.status().as_u16());
            return None;
        }

        match resp.json::<Envelope>().await {
            Ok(envelope) => envelope.into_payload(),
            Err(e) => {
                tracing::error!("[Gateway] Error fetching {}: {}", what, e);
                None
            }
        }
    }
}

#[async_trait]
impl SensorGateway for GatewayClient {
    async fn list_sensors(&self) -> Result<BTreeMap<String, SensorDescriptor>, BridgeError> {
        let url = self.endpoint(&["api", "sensors"])?;

        match self.fetch_payload(url, "sensors").await {
            Some(payload) => models::parse_directory(payload),
            None => Ok(BTreeMap::new()),
        }
    }

    async fn get_latest_reading(&self, sensor_id: &str) -> Result<Option<Reading>, BridgeError> {
        let url = self.endpoint(&["api", "sensor-data", "sensor", sensor_id])?;
        let what = format!("data for sensor {}", sensor_id);

        match self.fetch_payload(url, &what).await {
            Some(payload) => Ok(models::select_latest(models::parse_readings(
                sensor_id, payload,
            )?)),
            None => Ok(None),
        }
    }
}
