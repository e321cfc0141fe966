/// Three-axis reading from the IMU.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// GNSS time of capture as reported by the sensor node.
///
/// Components are kept as received; a receiver without a fix reports zeros
/// and those readings are still relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp {
    pub day: u8,
    pub month: u8,
    /// Full four-digit year.
    pub year: u16,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Timestamp {
    /// Two-digit wire years are taken as years of the 21st century.
    pub fn normalize_year(wire: u16) -> u16 {
        if wire < 100 {
            2000 + wire
        } else {
            wire
        }
    }

    /// `HH:MM:SS`
    pub fn time_string(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }

    /// `DD-MM-YYYY`
    pub fn date_string(&self) -> String {
        format!("{:02}-{:02}-{:04}", self.day, self.month, self.year)
    }
}

/// One complete set of readings captured at a single instant on the remote node.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub acceleration: Vector3,
    pub gyroscope: Vector3,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f32,
    pub timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_year() {
        assert_eq!(Timestamp::normalize_year(24), 2024);
        assert_eq!(Timestamp::normalize_year(0), 2000);
        assert_eq!(Timestamp::normalize_year(99), 2099);
        assert_eq!(Timestamp::normalize_year(2031), 2031);
    }

    #[test]
    fn test_time_and_date_are_zero_padded() {
        let ts = Timestamp {
            day: 5,
            month: 6,
            year: 2024,
            hour: 7,
            minute: 8,
            second: 9,
        };
        assert_eq!(ts.time_string(), "07:08:09");
        assert_eq!(ts.date_string(), "05-06-2024");
    }

    #[test]
    fn test_no_fix_timestamp_formats() {
        let ts = Timestamp::default();
        assert_eq!(ts.time_string(), "00:00:00");
        assert_eq!(ts.date_string(), "00-00-0000");
    }
}
