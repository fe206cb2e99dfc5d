//! SpaceX launch history (r/SpaceX API v4). The body is a bare array.

use super::{decode_records, null_as_default, Feed, FeedRequest};
use crate::config::AstroConfig;
use crate::error::FetchResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceXLaunch {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub date_utc: Option<String>,
    pub details: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub links: SpaceXLinks,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceXLinks {
    pub webcast: Option<String>,
    pub article: Option<String>,
    pub wikipedia: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceXLaunchesFeed;

impl Feed for SpaceXLaunchesFeed {
    type Output = Vec<SpaceXLaunch>;

    fn name(&self) -> &'static str {
        "spacex"
    }

    fn request(&self, config: &AstroConfig) -> FeedRequest {
        FeedRequest::get(config.feeds.spacex.clone())
    }

    fn extract(&self, body: Value) -> FetchResult<Vec<SpaceXLaunch>> {
        decode_records(self.name(), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_bare_array_with_null_links() {
        let body = json!([
            {"id": "5eb8", "name": "FalconSat", "details": null,
             "links": {"webcast": "https://youtu.be/x", "article": null, "wikipedia": null}},
            {"id": "5eb9", "name": "DemoSat"}
        ]);
        let launches = SpaceXLaunchesFeed.extract(body).expect("extract");
        assert_eq!(launches[0].links.webcast.as_deref(), Some("https://youtu.be/x"));
        assert_eq!(launches[1].links, SpaceXLinks::default());
    }

    #[test]
    fn object_body_is_rejected() {
        assert!(SpaceXLaunchesFeed.extract(json!({"error": "nope"})).is_err());
    }
}
