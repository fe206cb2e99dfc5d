//! Per-page view state.
//!
//! Every page owns one [`FeedState`] per feed it shows, plus its filter parameters. Fetch
//! results are applied with generation tickets: [`FeedState::begin`] hands out a ticket and only
//! the newest outstanding ticket may [`FeedState::resolve`] the state. A superseded response is
//! dropped instead of overwriting newer data. Projections are pure functions of
//! `(records, filters)` and hold no state of their own.

pub mod asteroids;
pub mod launches;
pub mod news;
pub mod weather;

pub use asteroids::{derive_asteroids, AsteroidSort, AsteroidSortKey, AsteroidsPage};
pub use launches::{filter_launches, LaunchesPage};
pub use news::{derive_news, news_sources, NewsAction, NewsFilters, NewsPage};
pub use weather::{aurora_outlook, has_major_flare, HomePage, SpaceWeatherPage, SpaceWeatherSummary};

use crate::error::{FetchError, ValidationError};
use crate::feeds::{Feed, FeedClient};
use serde::Serialize;
use std::cmp::Ordering;

/// Generation number of one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// `{ data, loading, error }` for one feed on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedState<T> {
    data: T,
    loading: bool,
    error: Option<String>,
    #[serde(skip)]
    generation: u64,
}

impl<T: Default> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

impl<T: Default> FeedState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch. Any ticket handed out earlier becomes stale.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.loading = true;
        Ticket(self.generation)
    }

    /// Apply a fetch outcome. Returns `false` (and changes nothing) for a stale or
    /// already-resolved ticket.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<T, FetchError>) -> bool {
        if ticket.0 != self.generation || !self.loading {
            tracing::debug!(
                target: "astrovision::view",
                ticket = ticket.0,
                current = self.generation,
                "dropping superseded fetch result"
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = data;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(target: "astrovision::view", feed = e.feed(), error = %e, "feed fetch failed");
                self.data = T::default();
                self.error = Some(e.to_string());
            }
        }
        true
    }
}

impl<T> FeedState<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Uniform envelope around a projection of the current data.
    pub fn envelope<U>(&self, project: impl FnOnce(&T) -> U) -> FeedEnvelope<U> {
        FeedEnvelope {
            data: project(&self.data),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

/// What the presentation layer receives for every feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEnvelope<U> {
    pub data: U,
    pub loading: bool,
    pub error: Option<String>,
}

/// Fetch `feed` into `state` under a fresh ticket. Returns whether the result was applied.
pub async fn refresh<F, S>(client: &FeedClient, feed: &F, state: &mut FeedState<S>) -> bool
where
    F: Feed,
    F::Output: Into<S>,
    S: Default,
{
    let ticket = state.begin();
    let result = client.fetch(feed).await.map(Into::into);
    state.resolve(ticket, result)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(ValidationError::UnknownSort(other.to_string())),
        }
    }
}

/// Compare optional keys under `order`; missing keys sort last either way.
pub(crate) fn cmp_missing_last<K: PartialOrd>(a: Option<K>, b: Option<K>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => order.apply(x.partial_cmp(&y).unwrap_or(Ordering::Equal)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
