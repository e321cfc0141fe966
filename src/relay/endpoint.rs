use serde::{Deserialize, Serialize};

use crate::telemetry::TelemetryRecord;

/// A record field that an endpoint can consume, named by its JSON key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum_macros::IntoStaticStr, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    AccelerationX,
    AccelerationY,
    AccelerationZ,
    GyroscopeX,
    GyroscopeY,
    GyroscopeZ,
    Latitude,
    Longitude,
    Speed,
    /// `HH:MM:SS`
    Time,
    /// `DD-MM-YYYY`
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(f32),
    Double(f64),
    Text(String),
}

impl Field {
    pub fn key(self) -> &'static str {
        self.into()
    }

    pub fn value(self, record: &TelemetryRecord) -> FieldValue {
        match self {
            Field::AccelerationX => FieldValue::Single(record.acceleration.x),
            Field::AccelerationY => FieldValue::Single(record.acceleration.y),
            Field::AccelerationZ => FieldValue::Single(record.acceleration.z),
            Field::GyroscopeX => FieldValue::Single(record.gyroscope.x),
            Field::GyroscopeY => FieldValue::Single(record.gyroscope.y),
            Field::GyroscopeZ => FieldValue::Single(record.gyroscope.z),
            Field::Latitude => FieldValue::Double(record.latitude),
            Field::Longitude => FieldValue::Double(record.longitude),
            Field::Speed => FieldValue::Single(record.speed),
            Field::Time => FieldValue::Text(record.timestamp.time_string()),
            Field::Date => FieldValue::Text(record.timestamp.date_string()),
        }
    }
}

/// A backend resource under `/api/v1/` and the fields it accepts, in body order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Endpoint {
    pub fn new(name: &str, fields: &[Field]) -> Self {
        Self {
            name: name.to_string(),
            fields: fields.to_vec(),
        }
    }
}

/// The IMU and GNSS resources served by the ground-station backend.
pub fn default_endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::new(
            "mpu6500",
            &[
                Field::AccelerationX,
                Field::AccelerationY,
                Field::AccelerationZ,
                Field::GyroscopeX,
                Field::GyroscopeY,
                Field::GyroscopeZ,
            ],
        ),
        Endpoint::new(
            "neo7m",
            &[
                Field::Latitude,
                Field::Longitude,
                Field::Speed,
                Field::Time,
                Field::Date,
            ],
        ),
    ]
}
