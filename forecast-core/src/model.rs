use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::Timestep;

/// Decoded response of one timelines fetch.
///
/// Timelines keep upstream array order, which is the order of the requested
/// timesteps. Consumers address them positionally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherResult {
    pub timelines: Vec<Timeline>,
}

impl WeatherResult {
    pub fn timeline(&self, index: usize) -> Option<&Timeline> {
        self.timelines.get(index)
    }

    /// First timeline with the given granularity.
    pub fn find(&self, timestep: Timestep) -> Option<&Timeline> {
        self.timelines.iter().find(|t| t.timestep == timestep)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub timestep: Timestep,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub intervals: Vec<Interval>,
}

impl Timeline {
    /// The first interval, which for a `current` timeline is the observation.
    pub fn current(&self) -> Option<&Interval> {
        self.intervals.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub start_time: DateTime<FixedOffset>,
    pub values: MetricValues,
}

/// Metrics for one interval. `None` means upstream did not provide the metric
/// for this granularity, not that it was zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValues {
    pub temperature: f64,
    pub dew_point: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_gust: Option<f64>,
    pub pressure_surface_level: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub precipitation_type: Option<i32>,
    pub rain_accumulation: Option<f64>,
    pub snow_accumulation: Option<f64>,
    pub ice_accumulation: Option<f64>,
    pub visibility: Option<f64>,
    pub uv_index: Option<i32>,
    pub weather_code: i32,
    pub epa_index: Option<i32>,
    pub epa_health_concern: Option<i32>,
    pub tree_index: Option<i32>,
    pub grass_index: Option<i32>,
    pub weed_index: Option<i32>,
}

/// Rounded daily high and low temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct DailyExtreme {
    pub high: i32,
    pub low: i32,
}
