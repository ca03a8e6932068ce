//! Query shapes used by the detail and list screens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{FieldSet, Timestep, WeatherQuery};

pub const DETAIL_FIELDS: &str = concat!(
    "temperature,dewPoint,humidity,windSpeed,windDirection,windGust,",
    "pressureSurfaceLevel,precipitationProbability,precipitationType,",
    "rainAccumulation,snowAccumulation,iceAccumulation,visibility,uvIndex,",
    "weatherCode,epaIndex,epaHealthConcern,treeIndex,grassIndex,weedIndex",
);

pub const LIST_FIELDS: &str = "temperature,weatherCode";

/// Field lists per view, injectable through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSets {
    pub detail: String,
    pub list: String,
}

impl Default for FieldSets {
    fn default() -> Self {
        Self {
            detail: DETAIL_FIELDS.to_string(),
            list: LIST_FIELDS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastView {
    /// Full detail screen: every metric, daily and hourly timelines, 5 days.
    Detail,
    /// Saved-location card: temperature and condition for the next day.
    List,
}

impl ForecastView {
    pub fn as_str(self) -> &'static str {
        match self {
            ForecastView::Detail => "detail",
            ForecastView::List => "list",
        }
    }

    pub fn timesteps(self) -> &'static [Timestep] {
        match self {
            ForecastView::Detail => &[Timestep::Current, Timestep::OneDay, Timestep::OneHour],
            ForecastView::List => &[Timestep::Current, Timestep::OneHour],
        }
    }

    pub fn lookahead(self) -> Duration {
        match self {
            ForecastView::Detail => Duration::days(5),
            ForecastView::List => Duration::days(1),
        }
    }

    /// Number of days the view shows highs and lows for.
    pub fn extreme_days(self) -> usize {
        match self {
            ForecastView::Detail => 5,
            ForecastView::List => 1,
        }
    }

    pub fn fields(self, sets: &FieldSets) -> FieldSet {
        match self {
            ForecastView::Detail => FieldSet::parse(&sets.detail),
            ForecastView::List => FieldSet::parse(&sets.list),
        }
    }

    /// Position of `timestep` in the timelines of a result fetched for this
    /// view. Upstream returns timelines in request order.
    pub fn timeline_index(self, timestep: Timestep) -> Option<usize> {
        self.timesteps().iter().position(|t| *t == timestep)
    }

    /// Query covering `now .. now + lookahead` for `location`.
    pub fn query(
        self,
        location: impl Into<String>,
        sets: &FieldSets,
        now: DateTime<Utc>,
    ) -> WeatherQuery {
        WeatherQuery::new(location, self.fields(sets))
            .timesteps(self.timesteps().to_vec())
            .window(now, now + self.lookahead())
    }
}

impl TryFrom<&str> for ForecastView {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "detail" => Ok(ForecastView::Detail),
            "list" => Ok(ForecastView::List),
            _ => Err(format!("Unknown view '{value}'. Supported views: detail, list.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn detail_query_matches_collaborator_shape() {
        let now = Utc.with_ymd_and_hms(2021, 12, 20, 10, 0, 0).unwrap();
        let q = ForecastView::Detail.query("1,2", &FieldSets::default(), now);

        assert_eq!(q.fields.to_string(), DETAIL_FIELDS);
        assert_eq!(q.fields.len(), 20);
        assert_eq!(Timestep::join(&q.timesteps), "current,1d,1h");
        assert_eq!(q.start_time, Some(now));
        assert_eq!(q.end_time, Some(now + Duration::seconds(432_000)));
    }

    #[test]
    fn list_query_matches_collaborator_shape() {
        let now = Utc.with_ymd_and_hms(2021, 12, 20, 10, 0, 0).unwrap();
        let q = ForecastView::List.query("1,2", &FieldSets::default(), now);

        assert_eq!(q.fields.to_string(), "temperature,weatherCode");
        assert_eq!(Timestep::join(&q.timesteps), "current,1h");
        assert_eq!(q.end_time, Some(now + Duration::seconds(86_400)));
    }

    #[test]
    fn timeline_positions_follow_request_order() {
        let detail = ForecastView::Detail;
        assert_eq!(detail.timeline_index(Timestep::OneHour), Some(2));
        assert_eq!(detail.timeline_index(Timestep::OneDay), Some(1));
        let list = ForecastView::List;
        assert_eq!(list.timeline_index(Timestep::OneHour), Some(1));
        assert_eq!(list.timeline_index(Timestep::OneDay), None);
    }

    #[test]
    fn injected_field_sets_override_defaults() {
        let sets = FieldSets {
            list: "temperature,humidity".into(),
            ..FieldSets::default()
        };
        let fields = ForecastView::List.fields(&sets);
        assert!(fields.contains("humidity"));
        assert!(!fields.contains("weatherCode"));
    }
}
