//! SensorEntity: one (sensor, measurement type) pair

use serde::Serialize;

use crate::entity::measurement::MeasurementType;
use crate::gateway::CoordinatorState;
use crate::models::SensorDescriptor;

pub const DOMAIN: &str = "agrinode";
const MANUFACTURER: &str = "AgriNode";
const DEFAULT_MODEL: &str = "Generic Sensor";

/// Grouping of entities under one physical sensor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EntityAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Rendered view of an entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub unique_id: String,
    pub name: String,
    pub sensor_id: String,
    pub measurement: MeasurementType,
    pub state: Option<f64>,
    pub available: bool,
    pub unit_of_measurement: &'static str,
    pub icon: &'static str,
    pub device_class: &'static str,
    pub state_class: &'static str,
    pub device: DeviceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_area: Option<String>,
    pub attributes: EntityAttributes,
}

#[derive(Debug, Clone)]
pub struct SensorEntity {
    sensor_id: String,
    measurement: MeasurementType,
    name: String,
    unique_id: String,
    device: DeviceInfo,
    suggested_area: Option<String>,
    native_value: Option<f64>,
    available: bool,
    attributes: EntityAttributes,
}

impl SensorEntity {
    pub fn new(descriptor: &SensorDescriptor, measurement: MeasurementType) -> Self {
        let display_name = descriptor.display_name().to_string();

        Self {
            sensor_id: descriptor.sensor_id.clone(),
            measurement,
            name: format!("{} {}", display_name, measurement.label()),
            unique_id: format!("{}_{}_{}", DOMAIN, descriptor.sensor_id, measurement.key()),
            device: DeviceInfo {
                identifiers: vec![(DOMAIN.to_string(), descriptor.sensor_id.clone())],
                name: display_name,
                manufacturer: MANUFACTURER.to_string(),
                model: descriptor
                    .sensor_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            },
            suggested_area: descriptor.location.clone().filter(|l| !l.is_empty()),
            native_value: None,
            available: false,
            attributes: EntityAttributes::default(),
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Availability as of the last render
    pub fn available(&self) -> bool {
        self.available
    }

    /// Last cycle succeeded and it carried this sensor's measurement
    pub fn is_available(&self, state: &CoordinatorState) -> bool {
        state.last_update_success
            && state
                .snapshot
                .has_measurement(&self.sensor_id, self.measurement.key())
    }

    /// Re-read this entity's value from a freshly published state. The
    /// previous value is kept when the measurement is absent.
    pub fn handle_update(&mut self, state: &CoordinatorState) {
        let reading = state.snapshot.reading(&self.sensor_id);

        if let Some(reading) = reading {
            if reading.has(self.measurement.key()) {
                self.native_value = reading
                    .value(self.measurement.key())
                    .map(|v| self.measurement.normalize(v));
            }
        }

        self.attributes.last_updated = reading.and_then(|r| r.timestamp_display());
        self.available = self.is_available(state);
    }

    pub fn state(&self) -> EntityState {
        EntityState {
            unique_id: self.unique_id.clone(),
            name: self.name.clone(),
            sensor_id: self.sensor_id.clone(),
            measurement: self.measurement,
            state: self.native_value,
            available: self.available,
            unit_of_measurement: self.measurement.unit(),
            icon: self.measurement.icon(),
            device_class: self.measurement.device_class(),
            state_class: self.measurement.state_class(),
            device: self.device.clone(),
            suggested_area: self.suggested_area.clone(),
            attributes: self.attributes.clone(),
        }
    }
}
