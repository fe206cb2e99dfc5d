//! Fetch adapters: one GET per feed, status check, JSON decode, envelope extraction.
//!
//! Network I/O lives in [`FeedClient::fetch`]; payload unwrapping lives in [`Feed::extract`],
//! which is a pure function over the decoded JSON body.

pub mod asteroids;
pub mod iss;
pub mod launches;
pub mod news;
pub mod spacex;
pub mod weather;

pub use asteroids::{Asteroid, AsteroidFeed, CloseApproach};
pub use iss::{IssFeed, IssPosition};
pub use launches::{Launch, UpcomingLaunchesFeed};
pub use news::{Article, NewsFeed};
pub use spacex::{SpaceXLaunch, SpaceXLaunchesFeed};
pub use weather::{KpIndexFeed, KpSample, SolarFlare, SolarFlareFeed};

use crate::config::AstroConfig;
use crate::error::{FetchError, FetchResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;

/// A resolved upstream request: base URL plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub url: String,
    pub query: Vec<(&'static str, String)>,
}

impl FeedRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }
}

/// One upstream feed.
pub trait Feed {
    type Output;

    /// Stable feed name, carried by every [`FetchError`].
    fn name(&self) -> &'static str;

    fn request(&self, config: &AstroConfig) -> FeedRequest;

    /// Unwrap the provider envelope into the payload this feed exposes.
    fn extract(&self, body: Value) -> FetchResult<Self::Output>;
}

/// Shared HTTP client for all feeds. Does not retry or cache.
#[derive(Clone)]
pub struct FeedClient {
    client: reqwest::Client,
    config: Arc<AstroConfig>,
}

impl FeedClient {
    pub fn new(config: Arc<AstroConfig>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .user_agent(concat!("astrovision/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, config }
    }

    pub fn with_client(client: reqwest::Client, config: Arc<AstroConfig>) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &AstroConfig {
        &self.config
    }

    pub async fn fetch<F: Feed>(&self, feed: &F) -> FetchResult<F::Output> {
        let name = feed.name();
        let req = feed.request(&self.config);
        tracing::debug!(target: "astrovision::feeds", feed = name, url = %req.url, "fetching feed");

        let res = self
            .client
            .get(&req.url)
            .query(&req.query)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                feed: name,
                message: e.to_string(),
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(
                target: "astrovision::feeds",
                feed = name,
                status = status.as_u16(),
                body = %body.chars().take(200).collect::<String>(),
                "feed returned non-success status"
            );
            return Err(FetchError::Status {
                feed: name,
                status: status.as_u16(),
            });
        }

        let body: Value = res
            .json()
            .await
            .map_err(|e| FetchError::decode(name, e.to_string()))?;
        feed.extract(body)
    }
}

/// Remove `key` from a JSON object body.
pub(crate) fn take_field(feed: &'static str, body: Value, key: &str) -> FetchResult<Value> {
    match body {
        Value::Object(mut map) => map
            .remove(key)
            .ok_or_else(|| FetchError::decode(feed, format!("missing `{}`", key))),
        other => Err(FetchError::decode(
            feed,
            format!("expected an object with `{}`, got {}", key, json_kind(&other)),
        )),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(feed: &'static str, value: Value) -> FetchResult<T> {
    serde_json::from_value(value).map_err(|e| FetchError::decode(feed, e.to_string()))
}

/// Decode an array payload record by record. A malformed record is skipped with a warning
/// instead of failing the whole feed.
pub(crate) fn decode_records<T: DeserializeOwned>(feed: &'static str, value: Value) -> FetchResult<Vec<T>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(FetchError::decode(
                feed,
                format!("expected an array, got {}", json_kind(&other)),
            ))
        }
    };
    let records = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(target: "astrovision::feeds", feed, index, error = %e, "skipping malformed record");
                None
            }
        })
        .collect();
    Ok(records)
}

/// `deserialize_with` for scalars that providers send as `null`: reads `null` as the default.
pub(crate) fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(de).map(Option::unwrap_or_default)
}

/// `deserialize_with` for optional text that may arrive as a number. Other shapes read as absent.
pub(crate) fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Numbers that providers send either as JSON numbers or as numeric strings.
pub(crate) fn lenient_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn take_field_reports_missing_key_with_feed_name() {
        let err = take_field("news", json!({"count": 0}), "results").unwrap_err();
        assert_eq!(err.feed(), "news");
        assert!(err.to_string().contains("missing `results`"));

        let err = take_field("news", json!([1, 2]), "results").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn lenient_number_accepts_strings_and_numbers() {
        assert_eq!(lenient_number(&json!("12.5")), Some(12.5));
        assert_eq!(lenient_number(&json!(3)), Some(3.0));
        assert_eq!(lenient_number(&json!("n/a")), None);
        assert_eq!(lenient_number(&json!(null)), None);
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Row {
        #[serde(deserialize_with = "null_as_default")]
        name: String,
        #[serde(deserialize_with = "null_as_default")]
        score: f64,
        #[serde(deserialize_with = "lenient_string")]
        stamp: Option<String>,
    }

    #[test]
    fn null_scalars_read_as_defaults() {
        let row: Row = serde_json::from_value(json!({"name": null, "score": null, "stamp": 1738368000}))
            .expect("row");
        assert_eq!(row.name, "");
        assert_eq!(row.score, 0.0);
        assert_eq!(row.stamp.as_deref(), Some("1738368000"));

        let row: Row = serde_json::from_value(json!({"stamp": {"nested": true}})).expect("row");
        assert_eq!(row.stamp, None);
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let rows: Vec<Row> = decode_records(
            "test",
            json!([{"name": "ok", "score": 1.5}, {"name": ["not", "a", "string"]}, {"name": "also ok"}]),
        )
        .expect("records");
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ok", "also ok"]);

        let err = decode_records::<Row>("test", json!({"results": []})).unwrap_err();
        assert!(err.to_string().contains("expected an array, got an object"));
    }

    #[test]
    fn request_builder_keeps_param_order() {
        let req = FeedRequest::get("http://x").param("a", "1").param("b", "2");
        assert_eq!(req.query, vec![("a", "1".to_string()), ("b", "2".to_string())]);
    }
}
