//! Configuration module

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::BridgeError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Connection settings for the AgriNode gateway
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(String::new(), default_gateway_port(), None)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

fn default_gateway_port() -> u16 {
    5066
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_scan_interval() -> u64 {
    300
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8082
}

impl GatewayConfig {
    pub fn new(host: impl Into<String>, port: u16, api_key: Option<String>) -> Self {
        Self {
            host: host.into(),
            port,
            api_key,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    /// API key, treating an empty string as unset
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// `http://{host}:{port}`
    pub fn base_url(&self) -> Result<Url, BridgeError> {
        let raw = format!("http://{}:{}", self.host.trim(), self.port);
        Url::parse(&raw).map_err(|e| BridgeError::Config(format!("invalid gateway host: {}", e)))
    }
}

impl PollerConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(environment())
    }

    /// Env values stay strings here; numeric fields are converted when
    /// deserialized so keys and hosts keep their exact text.
    fn load_from(env: config::Environment) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(env)
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.gateway.host.trim().is_empty() {
            return Err(BridgeError::Config("gateway.host is required".to_string()));
        }
        if self.gateway.request_timeout_ms == 0 {
            return Err(BridgeError::Config(
                "gateway.request_timeout_ms must be positive".to_string(),
            ));
        }
        if self.poller.scan_interval_secs == 0 {
            return Err(BridgeError::Config(
                "poller.scan_interval_secs must be positive".to_string(),
            ));
        }
        self.gateway.base_url()?;
        Ok(())
    }
}

/// `AGRINODE__SECTION__KEY` variables, e.g. `AGRINODE__GATEWAY__API_KEY`
fn environment() -> config::Environment {
    config::Environment::with_prefix("AGRINODE").separator("__")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_host(host: &str) -> Config {
        Config {
            gateway: GatewayConfig::new(host, 5066, None),
            poller: PollerConfig::default(),
            server: ServerConfig::default(),
        }
    }

    #[test]
    fn test_defaults_from_minimal_source() {
        let settings = config::Config::builder()
            .set_override("gateway.host", "192.168.1.20")
            .unwrap()
            .build()
            .unwrap();
        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(config.gateway.port, 5066);
        assert_eq!(config.gateway.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.poller.scan_interval(), Duration::from_secs(300));
        assert_eq!(config.server.port, 8082);
        assert!(config.gateway.api_key().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_gateway_section_rejected() {
        let settings = config::Config::builder().build().unwrap();
        let config: Config = settings.try_deserialize().unwrap();
        assert!(matches!(config.validate(), Err(BridgeError::Config(_))));
    }

    #[test]
    fn test_blank_host_rejected() {
        let err = config_with_host("  ").validate().unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = config_with_host("gateway.local");
        config.poller.scan_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_api_key_is_unset() {
        let gw = GatewayConfig::new("gateway.local", 5066, Some(String::new()));
        assert!(gw.api_key().is_none());

        let gw = GatewayConfig::new("gateway.local", 5066, Some("secret".to_string()));
        assert_eq!(gw.api_key(), Some("secret"));
    }

    #[test]
    fn test_env_values_keep_their_text() {
        let vars = config::Map::from([
            ("AGRINODE__GATEWAY__HOST".to_string(), "10.0.0.7".to_string()),
            ("AGRINODE__GATEWAY__PORT".to_string(), "6000".to_string()),
            ("AGRINODE__GATEWAY__API_KEY".to_string(), "00123e4".to_string()),
            ("AGRINODE__POLLER__SCAN_INTERVAL_SECS".to_string(), "60".to_string()),
        ]);
        let config = Config::load_from(environment().source(Some(vars))).unwrap();

        assert_eq!(config.gateway.host, "10.0.0.7");
        assert_eq!(config.gateway.port, 6000);
        assert_eq!(config.gateway.api_key(), Some("00123e4"));
        assert_eq!(config.poller.scan_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_base_url() {
        let gw = GatewayConfig::new("10.0.0.5", 6000, None);
        assert_eq!(gw.base_url().unwrap().as_str(), "http://10.0.0.5:6000/");
    }
}
