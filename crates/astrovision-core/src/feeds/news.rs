//! Spaceflight news articles (Spaceflight News API v4).
//!
//! Article payloads disagree on where the timestamp and image live, so both are resolved
//! through fixed priority tables instead of probing keys at runtime.

use super::{decode_records, lenient_string, null_as_default, take_field, Feed, FeedRequest};
use crate::config::AstroConfig;
use crate::error::FetchResult;
use crate::fields::{resolve, sort_millis, Candidate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub id: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "lenient_string")]
    pub news_site: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(rename = "publishedAt", deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub published_at_camel: Option<String>,
    #[serde(rename = "publishedDate", deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "imageUrl", deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub image_url_camel: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn published_at(a: &Article) -> Option<&str> {
    a.published_at.as_deref()
}
fn published_at_camel(a: &Article) -> Option<&str> {
    a.published_at_camel.as_deref()
}
fn published_date(a: &Article) -> Option<&str> {
    a.published_date.as_deref()
}
fn published(a: &Article) -> Option<&str> {
    a.published.as_deref()
}
fn image_url(a: &Article) -> Option<&str> {
    a.image_url.as_deref()
}
fn image_url_camel(a: &Article) -> Option<&str> {
    a.image_url_camel.as_deref()
}
fn thumbnail(a: &Article) -> Option<&str> {
    a.thumbnail.as_deref()
}
fn image(a: &Article) -> Option<&str> {
    a.image.as_deref()
}

/// Publication timestamp keys, highest priority first.
pub const PUBLISHED_CANDIDATES: &[Candidate<Article>] = &[
    Candidate { key: "published_at", get: published_at },
    Candidate { key: "publishedAt", get: published_at_camel },
    Candidate { key: "publishedDate", get: published_date },
    Candidate { key: "published", get: published },
];

/// Image URL keys, highest priority first.
pub const IMAGE_CANDIDATES: &[Candidate<Article>] = &[
    Candidate { key: "image_url", get: image_url },
    Candidate { key: "imageUrl", get: image_url_camel },
    Candidate { key: "thumbnail", get: thumbnail },
    Candidate { key: "image", get: image },
];

impl Article {
    pub fn published(&self) -> Option<&str> {
        resolve(self, PUBLISHED_CANDIDATES)
    }

    pub fn image(&self) -> Option<&str> {
        resolve(self, IMAGE_CANDIDATES)
    }

    /// Sort key in epoch millis; unresolvable timestamps are epoch zero.
    pub fn published_millis(&self) -> i64 {
        sort_millis(self.published())
    }

    pub fn source(&self) -> &str {
        self.news_site.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NewsFeed;

impl Feed for NewsFeed {
    type Output = Vec<Article>;

    fn name(&self) -> &'static str {
        "news"
    }

    fn request(&self, config: &AstroConfig) -> FeedRequest {
        FeedRequest::get(config.feeds.news.clone())
    }

    fn extract(&self, body: Value) -> FetchResult<Vec<Article>> {
        decode_records(self.name(), take_field(self.name(), body, "results")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article(v: Value) -> Article {
        serde_json::from_value(v).expect("article")
    }

    #[test]
    fn camel_case_timestamp_resolves_when_alone() {
        let a = article(json!({"id": 1, "title": "t", "publishedAt": "2025-02-01T00:00:00Z"}));
        assert_eq!(a.published(), Some("2025-02-01T00:00:00Z"));
    }

    #[test]
    fn snake_case_timestamp_outranks_camel_case() {
        let a = article(json!({
            "id": 1,
            "published_at": "2025-02-02T00:00:00Z",
            "publishedAt": "2025-02-01T00:00:00Z",
            "published": "2020-01-01"
        }));
        assert_eq!(a.published(), Some("2025-02-02T00:00:00Z"));
    }

    #[test]
    fn image_priority_order_holds() {
        let a = article(json!({"id": 1, "thumbnail": "t.png", "image": "i.png"}));
        assert_eq!(a.image(), Some("t.png"));
        let a = article(json!({"id": 1, "imageUrl": "c.png", "thumbnail": "t.png"}));
        assert_eq!(a.image(), Some("c.png"));
        let a = article(json!({"id": 1, "image_url": null, "image": "i.png"}));
        assert_eq!(a.image(), Some("i.png"));
        assert_eq!(article(json!({"id": 1})).image(), None);
    }

    #[test]
    fn unwraps_results_envelope() {
        let body = json!({
            "count": 1,
            "results": [{
                "id": 28001,
                "title": "Starship flies",
                "summary": "Summary",
                "news_site": "SpaceNews",
                "url": "https://example.com/a",
                "published_at": "2025-02-01T12:00:00Z",
                "launches": []
            }]
        });
        let articles = NewsFeed.extract(body).expect("extract");
        assert_eq!(articles[0].source(), "SpaceNews");
        assert!(articles[0].extra.contains_key("launches"));
        assert_eq!(articles[0].published_millis(), 1_738_411_200_000);
    }

    #[test]
    fn null_text_and_numeric_timestamp_keep_the_feed() {
        let body = json!({
            "results": [
                {"id": 1, "title": null, "summary": null, "news_site": "NASA", "published": 1738411200000_u64},
                {"id": 2, "title": "Intact", "summary": "s", "published_at": "2025-02-01T12:00:00Z"},
                "not an article"
            ]
        });
        let articles = NewsFeed.extract(body).expect("extract");
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "");
        assert_eq!(articles[0].summary, "");
        assert_eq!(articles[0].published(), Some("1738411200000"));
        assert_eq!(articles[1].title, "Intact");
    }
}
