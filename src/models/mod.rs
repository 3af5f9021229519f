//! Data models for the AgriNode bridge

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;

// ============================================================================
// Gateway wire models
// ============================================================================

/// `{success, data}` envelope shared by every gateway endpoint
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Payload of a successful envelope, `None` when `success` is false or
    /// `data` is missing
    pub fn into_payload(self) -> Option<Value> {
        if self.success {
            self.data.filter(|d| !d.is_null())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    pub sensor_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub sensor_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SensorDescriptor {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.sensor_id)
    }
}

/// Reading timestamp as the gateway sent it: an ISO string or an epoch number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(serde_json::Number),
    Text(String),
}

impl Timestamp {
    fn is_empty(&self) -> bool {
        matches!(self, Timestamp::Text(s) if s.is_empty())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timestamp::Epoch(n) => write!(f, "{}", n),
            Timestamp::Text(s) => f.write_str(s),
        }
    }
}

/// Order two optional timestamps. Epoch numbers compare numerically and
/// strings lexically. A missing or empty timestamp is the oldest, and an
/// epoch ranks above a string.
fn compare_timestamps(a: Option<&Timestamp>, b: Option<&Timestamp>) -> Ordering {
    let a = a.filter(|t| !t.is_empty());
    let b = b.filter(|t| !t.is_empty());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Timestamp::Epoch(x)), Some(Timestamp::Epoch(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Timestamp::Text(x)), Some(Timestamp::Text(y))) => x.cmp(y),
        (Some(Timestamp::Epoch(_)), Some(Timestamp::Text(_))) => Ordering::Greater,
        (Some(Timestamp::Text(_)), Some(Timestamp::Epoch(_))) => Ordering::Less,
    }
}

/// One sample reported by a sensor. Measurement fields stay keyed by their
/// gateway name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl Reading {
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Numeric value of a measurement; numeric strings are accepted
    pub fn value(&self, key: &str) -> Option<f64> {
        match self.values.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Timestamp rendered for display, `None` when missing or empty
    pub fn timestamp_display(&self) -> Option<String> {
        self.timestamp
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
    }
}

/// Keep only the most recent reading; ties keep gateway order
pub fn select_latest(mut readings: Vec<Reading>) -> Option<Reading> {
    readings.sort_by(|a, b| compare_timestamps(b.timestamp.as_ref(), a.timestamp.as_ref()));
    readings.into_iter().next()
}

/// Decode a sensor directory payload into a map keyed by sensor id
pub fn parse_directory(payload: Value) -> Result<BTreeMap<String, SensorDescriptor>, BridgeError> {
    let sensors: Vec<SensorDescriptor> = serde_json::from_value(payload)
        .map_err(|e| BridgeError::MalformedResponse(format!("sensor directory: {}", e)))?;

    Ok(sensors
        .into_iter()
        .map(|s| (s.sensor_id.clone(), s))
        .collect())
}

pub fn parse_readings(sensor_id: &str, payload: Value) -> Result<Vec<Reading>, BridgeError> {
    serde_json::from_value(payload).map_err(|e| {
        BridgeError::MalformedResponse(format!("readings for sensor {}: {}", sensor_id, e))
    })
}

// ============================================================================
// Snapshot
// ============================================================================

/// Result of one poll cycle: the sensor directory plus the latest reading of
/// every sensor that answered
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub sensors: BTreeMap<String, SensorDescriptor>,
    pub data: BTreeMap<String, Reading>,
}

impl Snapshot {
    pub fn reading(&self, sensor_id: &str) -> Option<&Reading> {
        self.data.get(sensor_id)
    }

    pub fn has_measurement(&self, sensor_id: &str, key: &str) -> bool {
        self.reading(sensor_id).map_or(false, |r| r.has(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reading(ts: Option<&str>, temp: f64) -> Reading {
        let mut value = json!({ "air_temperature": temp });
        if let Some(ts) = ts {
            value["timestamp"] = json!(ts);
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_select_latest_picks_newest() {
        let readings = vec![
            reading(Some("2024-05-01T10:00:00Z"), 18.0),
            reading(Some("2024-05-01T12:00:00Z"), 21.5),
        ];
        let latest = select_latest(readings).unwrap();
        assert_eq!(latest.timestamp_display().as_deref(), Some("2024-05-01T12:00:00Z"));
        assert_eq!(latest.value("air_temperature"), Some(21.5));
    }

    #[test]
    fn test_select_latest_single_is_idempotent() {
        let only = reading(Some("2024-05-01T10:00:00Z"), 18.0);
        let first = select_latest(vec![only.clone()]).unwrap();
        assert_eq!(first, only);
        assert_eq!(select_latest(vec![first.clone()]).unwrap(), first);
    }

    #[test]
    fn test_select_latest_missing_timestamp_sorts_last() {
        let readings = vec![reading(None, 1.0), reading(Some("2024-01-01"), 2.0)];
        let latest = select_latest(readings).unwrap();
        assert_eq!(latest.value("air_temperature"), Some(2.0));
    }

    #[test]
    fn test_select_latest_ties_keep_order() {
        let readings = vec![reading(Some("t"), 1.0), reading(Some("t"), 2.0)];
        assert_eq!(select_latest(readings).unwrap().value("air_temperature"), Some(1.0));
    }

    #[test]
    fn test_select_latest_epoch_timestamps_compare_numerically() {
        // Lexically "999999999" > "1714554000", numerically it is older
        let readings = parse_readings(
            "s1",
            json!([
                {"timestamp": 999_999_999, "air_temperature": 9.0},
                {"timestamp": 1_714_554_000, "air_temperature": 17.0},
                {"timestamp": 1_714_550_400, "air_temperature": 16.0}
            ]),
        )
        .unwrap();
        let latest = select_latest(readings).unwrap();
        assert_eq!(latest.timestamp, Some(Timestamp::Epoch(1_714_554_000.into())));
        assert_eq!(latest.timestamp_display().as_deref(), Some("1714554000"));
        assert_eq!(latest.value("air_temperature"), Some(17.0));
    }

    #[test]
    fn test_select_latest_null_timestamp_sorts_last() {
        let readings = parse_readings(
            "s1",
            json!([
                {"timestamp": null, "air_temperature": 1.0},
                {"timestamp": 1_714_550_400, "air_temperature": 2.0}
            ]),
        )
        .unwrap();
        assert_eq!(readings[0].timestamp, None);
        assert_eq!(select_latest(readings).unwrap().value("air_temperature"), Some(2.0));
    }

    #[test]
    fn test_select_latest_empty() {
        assert!(select_latest(Vec::new()).is_none());
    }

    #[test]
    fn test_envelope_payload() {
        let env: Envelope = serde_json::from_value(json!({"success": true, "data": []})).unwrap();
        assert_eq!(env.into_payload(), Some(json!([])));

        let env: Envelope = serde_json::from_value(json!({"success": false, "data": []})).unwrap();
        assert!(env.into_payload().is_none());

        let env: Envelope = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(env.into_payload().is_none());

        let env: Envelope = serde_json::from_value(json!({"data": [1]})).unwrap();
        assert!(env.into_payload().is_none());
    }

    #[test]
    fn test_parse_directory_indexes_by_id() {
        let payload = json!([
            {"sensor_id": "s1", "name": "Greenhouse", "type": "climate", "location": "Greenhouse A"},
            {"sensor_id": "s2", "name": "Field"}
        ]);
        let dir = parse_directory(payload).unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir["s1"].sensor_type.as_deref(), Some("climate"));
        assert_eq!(dir["s2"].location, None);
    }

    #[test]
    fn test_parse_directory_requires_sensor_id() {
        let err = parse_directory(json!([{"name": "orphan"}])).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedResponse(_)));
    }

    #[test]
    fn test_reading_values() {
        let r: Reading = serde_json::from_value(json!({
            "timestamp": "2024-05-01T10:00:00Z",
            "battery_level": "87.5",
            "brightness": null,
            "soil_moisture": 40
        }))
        .unwrap();
        assert_eq!(r.value("battery_level"), Some(87.5));
        assert_eq!(r.value("soil_moisture"), Some(40.0));
        assert!(r.has("brightness"));
        assert_eq!(r.value("brightness"), None);
        assert!(!r.has("timestamp"));
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let d: SensorDescriptor = serde_json::from_value(json!({"sensor_id": "s9"})).unwrap();
        assert_eq!(d.display_name(), "s9");
    }
}
