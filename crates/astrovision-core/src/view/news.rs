//! News page: source chips, long-read toggle, free-text search, newest first.

use super::FeedState;
use crate::feeds::Article;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Summaries at least this long (in characters) count as long reads.
pub const LONG_READ_MIN_CHARS: usize = 250;
/// At most this many source chips are offered.
pub const MAX_SOURCES: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsFilters {
    pub query: String,
    pub selected_source: Option<String>,
    pub long_reads_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsAction {
    SetQuery(String),
    /// Select a source, or clear it if it is already selected.
    ToggleSource(String),
    ClearSource,
    ToggleLongReads,
    Reset,
}

impl NewsFilters {
    pub fn apply(&mut self, action: NewsAction) {
        match action {
            NewsAction::SetQuery(q) => self.query = q,
            NewsAction::ToggleSource(s) => {
                self.selected_source = if self.selected_source.as_deref() == Some(s.as_str()) {
                    None
                } else {
                    Some(s)
                };
            }
            NewsAction::ClearSource => self.selected_source = None,
            NewsAction::ToggleLongReads => self.long_reads_only = !self.long_reads_only,
            NewsAction::Reset => *self = NewsFilters::default(),
        }
    }

    fn admits(&self, article: &Article, needle: &str) -> bool {
        if let Some(source) = self.selected_source.as_deref() {
            if article.news_site.as_deref() != Some(source) {
                return false;
            }
        }
        if self.long_reads_only && article.summary.chars().count() < LONG_READ_MIN_CHARS {
            return false;
        }
        if needle.is_empty() {
            return true;
        }
        [article.title.as_str(), article.summary.as_str(), article.source()]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Filtered articles, newest first. Articles without a usable timestamp go last.
pub fn derive_news<'a>(records: &'a [Article], filters: &NewsFilters) -> Vec<&'a Article> {
    let needle = filters.query.trim().to_lowercase();
    let mut out: Vec<&Article> = records
        .iter()
        .filter(|a| filters.admits(a, &needle))
        .collect();
    out.sort_by_cached_key(|a| Reverse(a.published_millis()));
    out
}

/// Distinct non-empty sources in first-seen order, capped at [`MAX_SOURCES`].
pub fn news_sources(records: &[Article]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for site in records.iter().filter_map(|a| a.news_site.as_deref()) {
        if !site.is_empty() && !seen.contains(&site) {
            seen.push(site);
        }
    }
    seen.truncate(MAX_SOURCES);
    seen
}

#[derive(Debug, Clone, Default)]
pub struct NewsPage {
    pub articles: FeedState<Vec<Article>>,
    pub filters: NewsFilters,
}

impl NewsPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: NewsAction) {
        self.filters.apply(action);
    }

    pub fn projection(&self) -> Vec<&Article> {
        derive_news(self.articles.data(), &self.filters)
    }

    pub fn sources(&self) -> Vec<&str> {
        news_sources(self.articles.data())
    }
}
