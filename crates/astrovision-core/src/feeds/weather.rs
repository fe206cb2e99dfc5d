//! Space weather: NOAA SWPC planetary Kp index and NASA DONKI solar flares.

use super::{decode_records, null_as_default, Feed, FeedRequest};
use crate::config::AstroConfig;
use crate::error::FetchResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One-minute planetary Kp sample.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KpSample {
    #[serde(deserialize_with = "null_as_default")]
    pub time_tag: String,
    #[serde(deserialize_with = "null_as_default")]
    pub kp_index: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarFlare {
    #[serde(rename = "flrID", deserialize_with = "null_as_default")]
    pub flr_id: String,
    #[serde(rename = "beginTime", deserialize_with = "null_as_default")]
    pub begin_time: String,
    #[serde(rename = "peakTime")]
    pub peak_time: Option<String>,
    #[serde(rename = "classType", deserialize_with = "null_as_default")]
    pub class_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SolarFlare {
    /// X-class flares are the strongest GOES category.
    pub fn is_x_class(&self) -> bool {
        self.class_type.trim_start().starts_with('X')
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KpIndexFeed;

impl Feed for KpIndexFeed {
    type Output = Vec<KpSample>;

    fn name(&self) -> &'static str {
        "kp_index"
    }

    fn request(&self, config: &AstroConfig) -> FeedRequest {
        FeedRequest::get(config.feeds.kp_index.clone())
    }

    fn extract(&self, body: Value) -> FetchResult<Vec<KpSample>> {
        decode_records(self.name(), body)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SolarFlareFeed;

impl Feed for SolarFlareFeed {
    type Output = Vec<SolarFlare>;

    fn name(&self) -> &'static str {
        "solar_flares"
    }

    fn request(&self, config: &AstroConfig) -> FeedRequest {
        FeedRequest::get(config.feeds.solar_flares.clone()).param("api_key", config.nasa_api_key.clone())
    }

    fn extract(&self, body: Value) -> FetchResult<Vec<SolarFlare>> {
        // A `null` body means an empty window.
        if body.is_null() {
            return Ok(Vec::new());
        }
        decode_records(self.name(), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_kp_samples() {
        let body = json!([
            {"time_tag": "2025-02-01T00:00:00", "kp_index": 2, "estimated_kp": 2.33, "kp": "2P"},
            {"time_tag": "2025-02-01T00:01:00", "kp_index": 5}
        ]);
        let samples = KpIndexFeed.extract(body).expect("extract");
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].kp_index, 5.0);
        assert_eq!(samples[0].extra.get("kp"), Some(&json!("2P")));
    }

    #[test]
    fn null_kp_index_reads_as_zero() {
        let body = json!([
            {"time_tag": "2025-02-01T00:00:00", "kp_index": null},
            {"time_tag": "2025-02-01T00:01:00", "kp_index": 4}
        ]);
        let samples = KpIndexFeed.extract(body).expect("extract");
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].kp_index, 0.0);
        assert_eq!(samples[1].kp_index, 4.0);
    }

    #[test]
    fn decodes_donki_flares() {
        let body = json!([
            {"flrID": "2025-02-01T03:21:00-FLR-001", "beginTime": "2025-02-01T03:21Z",
             "peakTime": "2025-02-01T03:40Z", "classType": "M1.2", "activeRegionNum": 13981},
            {"flrID": "f2", "beginTime": "2025-02-02T10:00Z", "classType": "X1.1"}
        ]);
        let flares = SolarFlareFeed.extract(body).expect("extract");
        assert!(!flares[0].is_x_class());
        assert!(flares[1].is_x_class());
        assert!(flares[0].extra.contains_key("activeRegionNum"));
        assert!(SolarFlareFeed.extract(Value::Null).expect("null").is_empty());
    }

    #[test]
    fn flare_request_carries_api_key() {
        let cfg = AstroConfig::default();
        let req = SolarFlareFeed.request(&cfg);
        assert_eq!(req.query, vec![("api_key", "DEMO_KEY".to_string())]);
    }
}
