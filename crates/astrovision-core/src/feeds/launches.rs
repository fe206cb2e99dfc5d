//! Upcoming launches (Launch Library 2).

use super::{decode_records, null_as_default, take_field, Feed, FeedRequest};
use crate::config::AstroConfig;
use crate::error::FetchResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const UPCOMING_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Launch {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub window_start: Option<String>,
    pub window_end: Option<String>,
    pub mission: Option<Mission>,
    pub rocket: Option<Rocket>,
    pub pad: Option<Pad>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Mission {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rocket {
    pub configuration: Option<RocketConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RocketConfiguration {
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pad {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub location: Option<PadLocation>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PadLocation {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

impl Launch {
    /// Mission name, or empty when the provider has no mission attached yet.
    pub fn mission_name(&self) -> &str {
        self.mission.as_ref().map(|m| m.name.as_str()).unwrap_or("")
    }

    pub fn rocket_name(&self) -> Option<&str> {
        self.rocket
            .as_ref()
            .and_then(|r| r.configuration.as_ref())
            .map(|c| c.full_name.as_str())
    }

    pub fn pad_location(&self) -> Option<&str> {
        self.pad
            .as_ref()
            .and_then(|p| p.location.as_ref())
            .map(|l| l.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpcomingLaunchesFeed;

impl Feed for UpcomingLaunchesFeed {
    type Output = Vec<Launch>;

    fn name(&self) -> &'static str {
        "launches"
    }

    fn request(&self, config: &AstroConfig) -> FeedRequest {
        FeedRequest::get(config.feeds.launches.clone())
            .param("limit", UPCOMING_LIMIT.to_string())
            .param("mode", "detailed")
    }

    fn extract(&self, body: Value) -> FetchResult<Vec<Launch>> {
        decode_records(self.name(), take_field(self.name(), body, "results")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_results_and_tolerates_null_mission() {
        let body = json!({
            "count": 2,
            "next": null,
            "results": [
                {
                    "id": "a1",
                    "name": "Falcon 9 | Starlink",
                    "window_start": "2025-02-01T10:00:00Z",
                    "window_end": "2025-02-01T14:00:00Z",
                    "mission": {"name": "Starlink Group 12", "description": "Batch"},
                    "rocket": {"configuration": {"full_name": "Falcon 9 Block 5"}},
                    "pad": {"name": "SLC-40", "location": {"name": "Cape Canaveral"}},
                    "status": {"abbrev": "Go"}
                },
                {"id": "b2", "name": "Unknown payload", "mission": null}
            ]
        });
        let launches = UpcomingLaunchesFeed.extract(body).expect("extract");
        assert_eq!(launches.len(), 2);
        assert_eq!(launches[0].mission_name(), "Starlink Group 12");
        assert_eq!(launches[0].rocket_name(), Some("Falcon 9 Block 5"));
        assert_eq!(launches[0].pad_location(), Some("Cape Canaveral"));
        assert!(launches[0].extra.contains_key("status"));
        assert_eq!(launches[1].mission_name(), "");
    }

    #[test]
    fn null_names_read_as_empty() {
        let body = json!({
            "results": [
                {"id": "c3", "name": null, "mission": {"name": null, "description": null},
                 "rocket": {"configuration": {"full_name": null}}},
                {"id": "d4", "name": "Electron | Payload", "mission": {"name": "Payload"}}
            ]
        });
        let launches = UpcomingLaunchesFeed.extract(body).expect("extract");
        assert_eq!(launches.len(), 2);
        assert_eq!(launches[0].name, "");
        assert_eq!(launches[0].mission_name(), "");
        assert_eq!(launches[1].mission_name(), "Payload");
    }

    #[test]
    fn request_carries_limit_and_mode() {
        let req = UpcomingLaunchesFeed.request(&AstroConfig::default());
        assert!(req.url.ends_with("/launch/upcoming/"));
        assert_eq!(
            req.query,
            vec![("limit", "10".to_string()), ("mode", "detailed".to_string())]
        );
    }
}
