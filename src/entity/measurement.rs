//! Measurement types reported by AgriNode sensors

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    AirTemperature,
    AirHumidity,
    SoilMoisture,
    Brightness,
    BatteryLevel,
}

impl MeasurementType {
    pub const ALL: [MeasurementType; 5] = [
        MeasurementType::AirTemperature,
        MeasurementType::AirHumidity,
        MeasurementType::SoilMoisture,
        MeasurementType::Brightness,
        MeasurementType::BatteryLevel,
    ];

    /// Field name in gateway readings
    pub fn key(&self) -> &'static str {
        match self {
            MeasurementType::AirTemperature => "air_temperature",
            MeasurementType::AirHumidity => "air_humidity",
            MeasurementType::SoilMoisture => "soil_moisture",
            MeasurementType::Brightness => "brightness",
            MeasurementType::BatteryLevel => "battery_level",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MeasurementType::AirTemperature => "Temperature",
            MeasurementType::AirHumidity => "Humidity",
            MeasurementType::SoilMoisture => "Soil Moisture",
            MeasurementType::Brightness => "Brightness",
            MeasurementType::BatteryLevel => "Battery",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MeasurementType::AirTemperature => "°C",
            MeasurementType::AirHumidity => "%",
            MeasurementType::SoilMoisture => "%",
            MeasurementType::Brightness => "lx",
            MeasurementType::BatteryLevel => "%",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MeasurementType::AirTemperature => "mdi:thermometer",
            MeasurementType::AirHumidity => "mdi:water-percent",
            MeasurementType::SoilMoisture => "mdi:water",
            MeasurementType::Brightness => "mdi:brightness-5",
            MeasurementType::BatteryLevel => "mdi:battery",
        }
    }

    pub fn device_class(&self) -> &'static str {
        match self {
            MeasurementType::AirTemperature => "temperature",
            MeasurementType::AirHumidity => "humidity",
            MeasurementType::SoilMoisture => "moisture",
            MeasurementType::Brightness => "illuminance",
            MeasurementType::BatteryLevel => "battery",
        }
    }

    pub fn state_class(&self) -> &'static str {
        "measurement"
    }

    /// Map a raw gateway value to the displayed value. Battery levels are
    /// percentages and get clamped into [0, 100].
    pub fn normalize(&self, raw: f64) -> f64 {
        match self {
            MeasurementType::BatteryLevel => raw.max(0.0).min(100.0),
            _ => raw,
        }
    }
}
