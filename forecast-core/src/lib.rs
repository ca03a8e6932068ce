//! Core library for the `forecast` app.
//!
//! This crate defines:
//! - Request building for the tomorrow.io timelines endpoint
//! - Strict decoding of timelines responses into typed records
//! - Daily high/low aggregation over hourly intervals
//! - Persisted settings and an observable loading state for UI collaborators
//!
//! Nothing here reads ambient host state. Locale, timezone and credentials
//! are injected by the caller, see [`HostDefaults`] and [`RequestBuilder`].

pub mod aggregate;
pub mod conditions;
pub mod config;
pub mod decode;
pub mod error;
pub mod loader;
pub mod model;
pub mod provider;
pub mod query;
pub mod units;
pub mod view;

pub use aggregate::{DayMatch, daily_extremes, daily_extremes_by_date, daily_extremes_with};
pub use config::Config;
pub use decode::decode_weather;
pub use error::ForecastError;
pub use loader::{ForecastLoader, LoadingState};
pub use model::{DailyExtreme, Interval, MetricValues, Timeline, WeatherResult};
pub use provider::{ForecastProvider, fetch_cancellable, tomorrow::TomorrowIoProvider};
pub use query::{
    ApiKey, Coordinates, FieldSet, RequestBuilder, RequestDescriptor, TIMELINES_ENDPOINT, Timestep,
    WeatherQuery,
};
pub use units::{HostDefaults, Units};
pub use view::{DETAIL_FIELDS, FieldSets, ForecastView, LIST_FIELDS};
