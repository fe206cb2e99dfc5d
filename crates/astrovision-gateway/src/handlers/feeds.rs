//! `GET /api/feeds/*`: one page's projection per endpoint, in the `{data, loading, error}` envelope.

use super::{error_json, AppState};
use astrovision_core::export::asteroids_csv_file_name;
use astrovision_core::feeds::{
    AsteroidFeed, IssFeed, KpIndexFeed, NewsFeed, SolarFlareFeed, SpaceXLaunchesFeed,
    UpcomingLaunchesFeed,
};
use astrovision_core::fields::time_ago;
use astrovision_core::view::{
    refresh, AsteroidSort, AsteroidsPage, HomePage, LaunchesPage, NewsFilters, NewsPage,
    SpaceWeatherPage,
};
use astrovision_core::{FeedEnvelope, ValidationError};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Upstream data is refreshed at most every ten minutes.
pub const FEED_CACHE_CONTROL: &str = "public, max-age=600";

/// Failed envelopes must not be cached, so the next request retries upstream.
pub const NO_STORE: &str = "no-store";

fn cached<U: Serialize>(envelope: FeedEnvelope<U>) -> Response {
    let cache_control = if envelope.error.is_none() { FEED_CACHE_CONTROL } else { NO_STORE };
    ([(header::CACHE_CONTROL, cache_control)], Json(envelope)).into_response()
}

/// Envelope for a page backed by several feeds: still loading if any is, errors joined.
fn combine<U: Serialize>(data: U, states: &[(bool, Option<&str>)]) -> FeedEnvelope<U> {
    let errors: Vec<&str> = states.iter().filter_map(|(_, e)| *e).collect();
    FeedEnvelope {
        data,
        loading: states.iter().any(|(loading, _)| *loading),
        error: if errors.is_empty() {
            None
        } else {
            Some(errors.join("; "))
        },
    }
}

pub async fn iss(State(state): State<Arc<AppState>>) -> Response {
    let mut page = HomePage::new();
    tokio::join!(
        refresh(&state.feeds, &IssFeed, &mut page.iss),
        refresh(&state.feeds, &SolarFlareFeed, &mut page.flares),
    );
    let position = page.position().map(|p| {
        json!({
            "latitude": p.latitude,
            "longitude": p.longitude,
            "display": p.display(),
        })
    });
    let data = json!({ "position": position, "major_event": page.major_event() });
    cached(combine(
        data,
        &[
            (page.iss.is_loading(), page.iss.error()),
            (page.flares.is_loading(), page.flares.error()),
        ],
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct LaunchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn launches(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LaunchQuery>,
) -> Response {
    let mut page = LaunchesPage::new();
    tokio::join!(
        refresh(&state.feeds, &UpcomingLaunchesFeed, &mut page.upcoming),
        refresh(&state.feeds, &SpaceXLaunchesFeed, &mut page.spacex),
    );
    page.set_query(query.q);
    let data = json!({
        "count": page.headline_count(),
        "launches": page.projection(),
        "spacex": page.spacex.data(),
    });
    cached(combine(
        data,
        &[
            (page.upcoming.is_loading(), page.upcoming.error()),
            (page.spacex.is_loading(), page.spacex.error()),
        ],
    ))
}

pub async fn space_weather(State(state): State<Arc<AppState>>) -> Response {
    let mut page = SpaceWeatherPage::new();
    tokio::join!(
        refresh(&state.feeds, &KpIndexFeed, &mut page.kp),
        refresh(&state.feeds, &SolarFlareFeed, &mut page.flares),
    );
    cached(combine(
        page.summary(),
        &[
            (page.kp.is_loading(), page.kp.error()),
            (page.flares.is_loading(), page.flares.error()),
        ],
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct AsteroidQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl AsteroidQuery {
    fn feed(&self, state: &AppState) -> Result<AsteroidFeed, ValidationError> {
        let start = self.start_date.as_deref().unwrap_or(state.config.neo_start.as_str());
        let end = self.end_date.as_deref().unwrap_or(state.config.neo_end.as_str());
        AsteroidFeed::new(start, end)
    }

    fn sort(&self) -> Result<AsteroidSort, ValidationError> {
        let mut sort = AsteroidSort::default();
        if let Some(key) = self.sort.as_deref() {
            sort.key = key.parse()?;
        }
        if let Some(order) = self.order.as_deref() {
            sort.order = order.parse()?;
        }
        Ok(sort)
    }
}

async fn load_asteroids(state: &AppState, query: &AsteroidQuery) -> Result<AsteroidsPage, ValidationError> {
    let feed = query.feed(state)?;
    let mut page = AsteroidsPage::new();
    page.set_sort(query.sort()?);
    refresh(&state.feeds, &feed, &mut page.asteroids).await;
    Ok(page)
}

pub async fn asteroids(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AsteroidQuery>,
) -> Response {
    let page = match load_asteroids(&state, &query).await {
        Ok(page) => page,
        Err(e) => return error_json(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let envelope = page.asteroids.envelope(|_| {
        json!({
            "total": page.total(),
            "hazardous": page.hazardous_count(),
            "sort": page.sort,
            "asteroids": page.projection(),
        })
    });
    cached(envelope)
}

pub async fn asteroids_csv(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AsteroidQuery>,
) -> Response {
    let page = match load_asteroids(&state, &query).await {
        Ok(page) => page,
        Err(e) => return error_json(StatusCode::BAD_REQUEST, e.to_string()),
    };
    if let Some(err) = page.asteroids.error() {
        return error_json(StatusCode::BAD_GATEWAY, err);
    }
    let Some(csv) = page.csv() else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let disposition = format!(
        "attachment; filename=\"{}\"",
        asteroids_csv_file_name(Utc::now().date_naive())
    );
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, FEED_CACHE_CONTROL.to_string()),
        ],
        csv,
    )
        .into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    pub q: String,
    pub source: Option<String>,
    #[serde(default)]
    pub long_reads: bool,
}

pub async fn news(State(state): State<Arc<AppState>>, Query(query): Query<NewsQuery>) -> Response {
    let mut page = NewsPage::new();
    refresh(&state.feeds, &NewsFeed, &mut page.articles).await;
    page.filters = NewsFilters {
        query: query.q,
        selected_source: query.source.filter(|s| !s.is_empty()),
        long_reads_only: query.long_reads,
    };

    let now = Utc::now();
    let articles: Vec<Value> = page
        .projection()
        .into_iter()
        .filter_map(|a| {
            let mut value = serde_json::to_value(a).ok()?;
            if let Value::Object(map) = &mut value {
                map.insert("published".into(), json!(a.published()));
                map.insert("image".into(), json!(a.image()));
                map.insert("time_ago".into(), json!(time_ago(now, a.published())));
            }
            Some(value)
        })
        .collect();

    let envelope = page.articles.envelope(|_| {
        json!({
            "filters": page.filters,
            "sources": page.sources(),
            "articles": articles,
        })
    });
    cached(envelope)
}
