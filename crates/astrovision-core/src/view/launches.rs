//! Launches page: upcoming launches searchable by mission name, plus SpaceX history.

use super::FeedState;
use crate::feeds::{Launch, SpaceXLaunch};

/// Launches whose mission name contains `query`, case-insensitively. An empty query keeps all.
pub fn filter_launches<'a>(records: &'a [Launch], query: &str) -> Vec<&'a Launch> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|l| l.mission_name().to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct LaunchesPage {
    pub upcoming: FeedState<Vec<Launch>>,
    pub spacex: FeedState<Vec<SpaceXLaunch>>,
    pub query: String,
}

impl LaunchesPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn projection(&self) -> Vec<&Launch> {
        filter_launches(self.upcoming.data(), &self.query)
    }

    /// Headline count: matches when searching, otherwise everything fetched.
    pub fn headline_count(&self) -> usize {
        let matches = self.projection().len();
        if matches == 0 {
            self.upcoming.data().len()
        } else {
            matches
        }
    }
}
