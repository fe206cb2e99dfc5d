//! ISS position (Open Notify).

use super::{decode, lenient_number, take_field, Feed, FeedRequest};
use crate::config::AstroConfig;
use crate::error::FetchResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current sub-satellite point. Open Notify sends the coordinates as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssPosition {
    pub latitude: Value,
    pub longitude: Value,
}

impl IssPosition {
    pub fn latitude_deg(&self) -> Option<f64> {
        lenient_number(&self.latitude)
    }

    pub fn longitude_deg(&self) -> Option<f64> {
        lenient_number(&self.longitude)
    }

    /// `Lat 51.50°, Lon -0.12°`. An unparseable coordinate renders as a dash.
    pub fn display(&self) -> String {
        let fmt = |v: Option<f64>| v.map(|d| format!("{:.2}°", d)).unwrap_or_else(|| "—".to_string());
        format!("Lat {}, Lon {}", fmt(self.latitude_deg()), fmt(self.longitude_deg()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IssFeed;

impl Feed for IssFeed {
    type Output = IssPosition;

    fn name(&self) -> &'static str {
        "iss"
    }

    fn request(&self, config: &AstroConfig) -> FeedRequest {
        FeedRequest::get(config.feeds.iss.clone())
    }

    fn extract(&self, body: Value) -> FetchResult<IssPosition> {
        decode(self.name(), take_field(self.name(), body, "iss_position")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_iss_position() {
        let body = json!({
            "message": "success",
            "timestamp": 1738400000,
            "iss_position": {"latitude": "-12.3456", "longitude": "101.5"}
        });
        let pos = IssFeed.extract(body).expect("extract");
        assert_eq!(pos.latitude_deg(), Some(-12.3456));
        assert_eq!(pos.display(), "Lat -12.35°, Lon 101.50°");
    }

    #[test]
    fn missing_envelope_is_decode_error() {
        let err = IssFeed.extract(json!({"message": "success"})).unwrap_err();
        assert_eq!(err.feed(), "iss");
    }
}
