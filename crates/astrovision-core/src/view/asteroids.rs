//! Asteroids page: hazard counts, a sortable table, and CSV export.

use super::{cmp_missing_last, FeedState, SortOrder};
use crate::error::ValidationError;
use crate::export;
use crate::feeds::Asteroid;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AsteroidSortKey {
    #[default]
    ApproachDate,
    MissDistance,
    Name,
    Hazard,
}

impl std::str::FromStr for AsteroidSortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" | "approach_date" => Ok(Self::ApproachDate),
            "distance" | "miss_distance" => Ok(Self::MissDistance),
            "name" => Ok(Self::Name),
            "hazard" => Ok(Self::Hazard),
            other => Err(ValidationError::UnknownSort(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AsteroidSort {
    pub key: AsteroidSortKey,
    pub order: SortOrder,
}

/// Sorted view of the fetched asteroids. Records missing the sort key go last.
pub fn derive_asteroids<'a>(records: &'a [Asteroid], sort: AsteroidSort) -> Vec<&'a Asteroid> {
    let mut out: Vec<&Asteroid> = records.iter().collect();
    out.sort_by(|a, b| match sort.key {
        AsteroidSortKey::ApproachDate => cmp_missing_last(a.approach_date(), b.approach_date(), sort.order),
        AsteroidSortKey::MissDistance => {
            cmp_missing_last(a.miss_distance_km(), b.miss_distance_km(), sort.order)
        }
        AsteroidSortKey::Name => cmp_missing_last(Some(a.name.as_str()), Some(b.name.as_str()), sort.order),
        AsteroidSortKey::Hazard => cmp_missing_last(
            Some(a.is_potentially_hazardous_asteroid),
            Some(b.is_potentially_hazardous_asteroid),
            sort.order,
        ),
    });
    out
}

#[derive(Debug, Clone, Default)]
pub struct AsteroidsPage {
    pub asteroids: FeedState<Vec<Asteroid>>,
    pub sort: AsteroidSort,
}

impl AsteroidsPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sort(&mut self, sort: AsteroidSort) {
        self.sort = sort;
    }

    pub fn projection(&self) -> Vec<&Asteroid> {
        derive_asteroids(self.asteroids.data(), self.sort)
    }

    pub fn total(&self) -> usize {
        self.asteroids.data().len()
    }

    pub fn hazardous_count(&self) -> usize {
        self.asteroids
            .data()
            .iter()
            .filter(|a| a.is_potentially_hazardous_asteroid)
            .count()
    }

    /// CSV of the current projection. `None` while loading or when there is nothing to export.
    pub fn csv(&self) -> Option<String> {
        if self.asteroids.is_loading() {
            return None;
        }
        export::asteroids_csv(&self.projection())
    }
}
