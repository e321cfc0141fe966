use serde::ser::{Serialize, SerializeMap, Serializer};

use super::endpoint::{Endpoint, Field};
use super::error::DeliveryError;
use crate::telemetry::TelemetryRecord;

/// `{"data": {...}}` with the endpoint's fields in declared order.
struct Body<'a> {
    fields: &'a [Field],
    record: &'a TelemetryRecord,
}

struct Data<'a> {
    fields: &'a [Field],
    record: &'a TelemetryRecord,
}

impl Serialize for Body<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            "data",
            &Data {
                fields: self.fields,
                record: self.record,
            },
        )?;
        map.end()
    }
}

impl Serialize for Data<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in self.fields {
            map.serialize_entry(field.key(), &field.value(self.record))?;
        }
        map.end()
    }
}

/// Compact JSON body for one endpoint.
pub fn encode_body(endpoint: &Endpoint, record: &TelemetryRecord) -> Result<String, DeliveryError> {
    let body = Body {
        fields: &endpoint.fields,
        record,
    };
    Ok(serde_json::to_string(&body)?)
}
