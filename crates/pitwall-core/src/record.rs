//! Raw records returned by the timing source.
//!
//! The source omits or nulls fields freely, so everything it may drop is an
//! `Option` with a serde default. Records are plain data and are never
//! mutated after fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One driver entry from the `drivers` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    /// Car number.
    pub driver_number: u32,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub name_acronym: Option<String>,
}

impl Driver {
    /// Full display name, with placeholders for missing parts.
    #[must_use]
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("Unknown");
        let last = self.last_name.as_deref().unwrap_or("Driver");
        format!("{first} {last}")
    }
}

/// One lap entry from the `laps` endpoint.
///
/// A lap with a missing or non-positive duration is invalid (in/out laps,
/// red flags, data gaps) and is excluded from all statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    #[serde(default)]
    pub lap_number: Option<u32>,
    /// Lap time in seconds.
    #[serde(default)]
    pub lap_duration: Option<f64>,
    #[serde(default)]
    pub stint_number: Option<u32>,
}

impl Lap {
    /// Whether this lap carries a usable time.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lap_duration.is_some_and(|duration| duration > 0.0)
    }

    /// The lap time in seconds, if valid.
    #[must_use]
    pub fn valid_time(&self) -> Option<f64> {
        self.lap_duration.filter(|duration| *duration > 0.0)
    }
}

/// One stint declaration from the `stints` endpoint.
///
/// When present and matchable against laps, these are authoritative over any
/// inferred grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StintRecord {
    #[serde(default)]
    pub stint_number: Option<u32>,
    #[serde(default)]
    pub compound: Option<String>,
    #[serde(default)]
    pub lap_start: Option<u32>,
    #[serde(default)]
    pub lap_end: Option<u32>,
}

/// One session entry from the `sessions` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_key: u32,
    #[serde(default)]
    pub session_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub date_start: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lap_validity() {
        let timed = Lap {
            lap_number: Some(5),
            lap_duration: Some(92.481),
            stint_number: None,
        };
        assert!(timed.is_valid());
        assert_eq!(timed.valid_time(), Some(92.481));

        let untimed = Lap {
            lap_number: Some(1),
            lap_duration: None,
            stint_number: None,
        };
        assert!(!untimed.is_valid());
        assert_eq!(untimed.valid_time(), None);

        let zeroed = Lap {
            lap_number: Some(2),
            lap_duration: Some(0.0),
            stint_number: None,
        };
        assert!(!zeroed.is_valid());

        let negative = Lap {
            lap_number: Some(3),
            lap_duration: Some(-1.0),
            stint_number: None,
        };
        assert!(!negative.is_valid());
    }

    #[test]
    fn lap_deserializes_with_nulls_and_missing_fields() {
        let lap: Lap = serde_json::from_str(r#"{"lap_number": null, "lap_duration": 95.2}"#).unwrap();
        assert_eq!(lap.lap_number, None);
        assert!(lap.is_valid());
        assert_eq!(lap.stint_number, None);
    }

    #[test]
    fn driver_display_name_with_placeholders() {
        let full = Driver {
            driver_number: 1,
            first_name: Some("Max".to_string()),
            last_name: Some("Verstappen".to_string()),
            team_name: None,
            name_acronym: None,
        };
        assert_eq!(full.display_name(), "Max Verstappen");

        let anonymous = Driver {
            driver_number: 99,
            first_name: None,
            last_name: None,
            team_name: None,
            name_acronym: None,
        };
        assert_eq!(anonymous.display_name(), "Unknown Driver");
    }

    #[test]
    fn stint_record_deserializes_sparse_payload() {
        let record: StintRecord = serde_json::from_str(r#"{"compound": "MEDIUM"}"#).unwrap();
        assert_eq!(record.compound.as_deref(), Some("MEDIUM"));
        assert_eq!(record.stint_number, None);
        assert_eq!(record.lap_start, None);
        assert_eq!(record.lap_end, None);
    }

    #[test]
    fn session_parses_rfc3339_start_date() {
        let session: Session = serde_json::from_str(
            r#"{
                "session_key": 9161,
                "session_name": "Race",
                "location": "Singapore",
                "country_name": "Singapore",
                "date_start": "2023-09-17T12:00:00+00:00"
            }"#,
        )
        .unwrap();
        let start = session.date_start.unwrap();
        assert_eq!(start.to_rfc3339(), "2023-09-17T12:00:00+00:00");
    }
}
