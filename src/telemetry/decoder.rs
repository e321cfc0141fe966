use std::str::FromStr;

use super::error::DecodeError;
use super::record::{TelemetryRecord, Timestamp, Vector3};

/// Number of comma-separated fields following the sequence counter.
pub const FIELD_COUNT: usize = 15;

const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "acceleration_x",
    "acceleration_y",
    "acceleration_z",
    "gyroscope_x",
    "gyroscope_y",
    "gyroscope_z",
    "latitude",
    "longitude",
    "speed",
    "day",
    "month",
    "year",
    "hour",
    "minute",
    "second",
];

/// Parses one line of the form `<seq>: ax,ay,az,gx,gy,gz,lat,lon,speed,DD,MM,YY,hh,mm,ss`.
///
/// The sequence counter is checked for shape and then discarded. Either every
/// field parses or no record is produced.
pub fn decode(line: &str) -> Result<TelemetryRecord, DecodeError> {
    let line = line.trim_end_matches(['\r', '\n', '\0']);

    let (counter, rest) = line.split_once(':').ok_or(DecodeError::MissingCounter)?;
    if counter.trim().parse::<i64>().is_err() {
        return Err(DecodeError::MissingCounter);
    }

    let fields: Vec<&str> = if rest.trim().is_empty() {
        Vec::new()
    } else {
        rest.split(',').map(str::trim).collect()
    };

    if fields.len() != FIELD_COUNT {
        return Err(DecodeError::FieldCount {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    let f = |i: usize| parse_float::<f32>(i, fields[i]);
    let acceleration = Vector3::new(f(0)?, f(1)?, f(2)?);
    let gyroscope = Vector3::new(f(3)?, f(4)?, f(5)?);
    let latitude = parse_float::<f64>(6, fields[6])?;
    let longitude = parse_float::<f64>(7, fields[7])?;
    let speed = f(8)?;

    let timestamp = Timestamp {
        day: parse_int(9, fields[9])?,
        month: parse_int(10, fields[10])?,
        year: Timestamp::normalize_year(parse_int(11, fields[11])?),
        hour: parse_int(12, fields[12])?,
        minute: parse_int(13, fields[13])?,
        second: parse_int(14, fields[14])?,
    };

    Ok(TelemetryRecord {
        acceleration,
        gyroscope,
        latitude,
        longitude,
        speed,
        timestamp,
    })
}

/// Formats a record the way the sensor node puts it on the air.
///
/// Years 2000..=2099 go out as two digits; other years are written in full.
/// A year below 100 has no wire form of its own and reads back as `2000 + YY`.
pub fn encode(seq: u32, record: &TelemetryRecord) -> String {
    let ts = &record.timestamp;
    let year = if (2000..2100).contains(&ts.year) {
        ts.year - 2000
    } else {
        ts.year
    };
    format!(
        "{}: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        seq,
        record.acceleration.x,
        record.acceleration.y,
        record.acceleration.z,
        record.gyroscope.x,
        record.gyroscope.y,
        record.gyroscope.z,
        record.latitude,
        record.longitude,
        record.speed,
        ts.day,
        ts.month,
        year,
        ts.hour,
        ts.minute,
        ts.second,
    )
}

fn invalid(index: usize, value: &str) -> DecodeError {
    DecodeError::InvalidField {
        index,
        name: FIELD_NAMES[index],
        value: value.to_string(),
    }
}

trait Finite {
    fn is_finite_value(&self) -> bool;
}

impl Finite for f32 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

impl Finite for f64 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

fn parse_float<T: FromStr + Finite>(index: usize, value: &str) -> Result<T, DecodeError> {
    match value.parse::<T>() {
        Ok(v) if v.is_finite_value() => Ok(v),
        _ => Err(invalid(index, value)),
    }
}

fn parse_int<T: FromStr>(index: usize, value: &str) -> Result<T, DecodeError> {
    value.parse::<T>().map_err(|_| invalid(index, value))
}
