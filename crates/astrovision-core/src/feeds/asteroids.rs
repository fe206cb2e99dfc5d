//! Near-Earth objects (NASA NeoWs feed).
//!
//! NeoWs groups objects by calendar day: `{"near_earth_objects": {"2025-02-01": [..], ..}}`.
//! The adapter flattens every day into one sequence. Ordering is left to the consumer.

use super::{decode_records, lenient_number, null_as_default, take_field, Feed, FeedRequest};
use crate::config::AstroConfig;
use crate::error::{FetchError, FetchResult, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// NeoWs rejects feed windows longer than seven days.
pub const MAX_RANGE_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Asteroid {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nasa_jpl_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute_magnitude_h: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_potentially_hazardous_asteroid: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub close_approach_data: Vec<CloseApproach>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_diameter: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseApproach {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_approach_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miss_distance: Option<MissDistance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_velocity: Option<RelativeVelocity>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MissDistance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kilometers: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeVelocity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kilometers_per_second: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Asteroid {
    pub fn first_approach(&self) -> Option<&CloseApproach> {
        self.close_approach_data.first()
    }

    pub fn approach_date(&self) -> Option<&str> {
        self.first_approach()?.close_approach_date.as_deref()
    }

    pub fn miss_distance_km(&self) -> Option<f64> {
        let km = self.first_approach()?.miss_distance.as_ref()?.kilometers.as_ref()?;
        lenient_number(km)
    }

    fn velocity_value(&self) -> Option<&Value> {
        self.first_approach()?
            .relative_velocity
            .as_ref()?
            .kilometers_per_second
            .as_ref()
    }

    pub fn relative_velocity_kms(&self) -> Option<f64> {
        self.velocity_value().and_then(lenient_number)
    }

    /// Relative velocity exactly as the provider wrote it.
    pub fn relative_velocity_raw(&self) -> Option<String> {
        match self.velocity_value()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn hazard_label(&self) -> &'static str {
        if self.is_potentially_hazardous_asteroid {
            "High"
        } else {
            "Low"
        }
    }
}

/// NeoWs feed over an inclusive `start_date..=end_date` window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsteroidFeed {
    pub start_date: String,
    pub end_date: String,
}

impl AsteroidFeed {
    /// Validated window: ISO dates, ordered, at most [`MAX_RANGE_DAYS`] apart.
    pub fn new(start_date: &str, end_date: &str) -> Result<Self, ValidationError> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| ValidationError::InvalidDateRange(format!("`{}` is not YYYY-MM-DD", s)))
        };
        let start = parse(start_date)?;
        let end = parse(end_date)?;
        let span = (end - start).num_days();
        if span < 0 {
            return Err(ValidationError::InvalidDateRange(
                "end_date precedes start_date".to_string(),
            ));
        }
        if span > MAX_RANGE_DAYS {
            return Err(ValidationError::InvalidDateRange(format!(
                "window spans {} days; the limit is {}",
                span, MAX_RANGE_DAYS
            )));
        }
        Ok(Self {
            start_date: start.format("%Y-%m-%d").to_string(),
            end_date: end.format("%Y-%m-%d").to_string(),
        })
    }

    /// The configured default window, unvalidated.
    pub fn from_config(config: &AstroConfig) -> Self {
        Self {
            start_date: config.neo_start.clone(),
            end_date: config.neo_end.clone(),
        }
    }
}

impl Feed for AsteroidFeed {
    type Output = Vec<Asteroid>;

    fn name(&self) -> &'static str {
        "asteroids"
    }

    fn request(&self, config: &AstroConfig) -> FeedRequest {
        FeedRequest::get(config.feeds.asteroids.clone())
            .param("start_date", self.start_date.clone())
            .param("end_date", self.end_date.clone())
            .param("api_key", config.nasa_api_key.clone())
    }

    fn extract(&self, body: Value) -> FetchResult<Vec<Asteroid>> {
        let objects = flatten_near_earth_objects(self.name(), body)?;
        decode_records(self.name(), Value::Array(objects))
    }
}

/// Concatenate every per-day array under `near_earth_objects` into one flat sequence.
pub fn flatten_near_earth_objects(feed: &'static str, body: Value) -> FetchResult<Vec<Value>> {
    let grouped = match take_field(feed, body, "near_earth_objects")? {
        Value::Object(map) => map,
        _ => return Err(FetchError::decode(feed, "`near_earth_objects` is not a map")),
    };
    let mut flat = Vec::new();
    for (day, objects) in grouped {
        match objects {
            Value::Array(items) => flat.extend(items),
            _ => {
                return Err(FetchError::decode(
                    feed,
                    format!("`near_earth_objects.{}` is not an array", day),
                ))
            }
        }
    }
    Ok(flat)
}
