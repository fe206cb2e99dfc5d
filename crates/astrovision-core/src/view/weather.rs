//! Space-weather and home pages.

use super::FeedState;
use crate::feeds::{IssPosition, KpSample, SolarFlare};
use serde::Serialize;

/// Kp above this suggests visible aurora at mid latitudes.
pub const AURORA_KP_THRESHOLD: f64 = 4.0;

pub fn aurora_outlook(kp: Option<f64>) -> &'static str {
    match kp {
        Some(kp) if kp > AURORA_KP_THRESHOLD => "Elevated aurora activity possible.",
        _ => "Low aurora activity expected.",
    }
}

/// True when any flare in the window is X-class.
pub fn has_major_flare(flares: &[SolarFlare]) -> bool {
    flares.iter().any(SolarFlare::is_x_class)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpaceWeatherSummary<'a> {
    /// Most recent Kp sample (the providers list oldest first).
    pub kp: Option<f64>,
    pub kp_time: Option<&'a str>,
    pub latest_flare: Option<&'a SolarFlare>,
    pub aurora: &'static str,
    pub flare_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SpaceWeatherPage {
    pub kp: FeedState<Vec<KpSample>>,
    pub flares: FeedState<Vec<SolarFlare>>,
}

impl SpaceWeatherPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.kp.is_loading() || self.flares.is_loading()
    }

    pub fn summary(&self) -> SpaceWeatherSummary<'_> {
        let latest_kp = self.kp.data().last();
        let kp = latest_kp.map(|s| s.kp_index);
        SpaceWeatherSummary {
            kp,
            kp_time: latest_kp.map(|s| s.time_tag.as_str()),
            latest_flare: self.flares.data().last(),
            aurora: aurora_outlook(kp),
            flare_count: self.flares.data().len(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HomePage {
    pub iss: FeedState<Option<IssPosition>>,
    pub flares: FeedState<Vec<SolarFlare>>,
}

impl HomePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<&IssPosition> {
        self.iss.data().as_ref()
    }

    pub fn major_event(&self) -> bool {
        has_major_flare(self.flares.data())
    }
}
