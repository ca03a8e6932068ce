//! Query building for the timelines endpoint.
//!
//! Building is pure: the same [`WeatherQuery`] and `now` always produce the
//! same [`RequestDescriptor`]. Ambient host facts (locale, timezone) and the
//! API credential are injected through [`RequestBuilder`].

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use url::Url;

use crate::{ForecastError, HostDefaults, Units};

/// Default upstream endpoint.
pub const TIMELINES_ENDPOINT: &str = "https://api.tomorrow.io/v4/timelines";

/// Window, in seconds, used when the caller gives no `end_time`.
pub const DEFAULT_LOOKAHEAD_SECS: i64 = 60;

/// Granularity of a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timestep {
    #[serde(rename = "current")]
    Current,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
}

impl Timestep {
    pub const fn as_str(self) -> &'static str {
        match self {
            Timestep::Current => "current",
            Timestep::OneHour => "1h",
            Timestep::OneDay => "1d",
        }
    }

    /// Parse a comma-joined list such as `"current,1d,1h"`, keeping order.
    pub fn parse_list(value: &str) -> Result<Vec<Timestep>, ForecastError> {
        value.split(',').map(|s| s.trim().parse()).collect()
    }

    pub fn join(timesteps: &[Timestep]) -> String {
        timesteps
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Timestep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timestep {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(Timestep::Current),
            "1h" => Ok(Timestep::OneHour),
            "1d" => Ok(Timestep::OneDay),
            other => Err(ForecastError::invalid(format!(
                "unsupported timestep '{other}', expected current, 1h or 1d"
            ))),
        }
    }
}

/// Ordered list of metric names to request. Not checked against a whitelist;
/// upstream rejects names it does not know.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldSet(Vec<String>);

impl FieldSet {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    /// Split a comma-joined field list. Empty segments are dropped.
    pub fn parse(value: &str) -> Self {
        Self::new(value.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|f| f == field)
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// A latitude/longitude pair rendered as the `"lat,long"` location form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinates {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, long) = s
            .split_once(',')
            .ok_or_else(|| ForecastError::invalid(format!("'{s}' is not a lat,long pair")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| ForecastError::invalid(format!("'{v}' is not a coordinate: {e}")))
        };
        let latitude = parse(lat)?;
        let longitude = parse(long)?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ForecastError::invalid(format!("'{s}' is out of range")));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// API credential. Debug output never shows the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// What the caller wants to know, before defaults are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub location: String,
    pub fields: FieldSet,
    /// `None` resolves from the host locale.
    pub units: Option<Units>,
    pub timesteps: Vec<Timestep>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// IANA identifier; `None` uses the host timezone.
    pub timezone: Option<String>,
}

impl WeatherQuery {
    pub fn new(location: impl Into<String>, fields: FieldSet) -> Self {
        Self {
            location: location.into(),
            fields,
            units: None,
            timesteps: vec![Timestep::Current],
            start_time: None,
            end_time: None,
            timezone: None,
        }
    }

    pub fn units(mut self, units: Option<Units>) -> Self {
        self.units = units;
        self
    }

    pub fn timesteps(mut self, timesteps: impl Into<Vec<Timestep>>) -> Self {
        self.timesteps = timesteps.into();
        self
    }

    pub fn window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// A fully formed upstream request: method and URL, no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
}

impl RequestDescriptor {
    /// The URL with the `apikey` value masked, for logs and display.
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "apikey" {
                    "***".to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), v)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }

    /// Value of a single query parameter, percent-decoded.
    pub fn param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

/// Turns [`WeatherQuery`] values into [`RequestDescriptor`]s.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    endpoint: String,
    api_key: ApiKey,
    host: HostDefaults,
}

impl RequestBuilder {
    pub fn new(endpoint: impl Into<String>, api_key: ApiKey, host: HostDefaults) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            host,
        }
    }

    pub fn host(&self) -> &HostDefaults {
        &self.host
    }

    /// Build with the wall clock as the default-time fallback.
    pub fn build(&self, query: &WeatherQuery) -> Result<RequestDescriptor, ForecastError> {
        self.build_at(query, Utc::now())
    }

    /// Build with an explicit `now`, used for the start/end defaults.
    pub fn build_at(
        &self,
        query: &WeatherQuery,
        now: DateTime<Utc>,
    ) -> Result<RequestDescriptor, ForecastError> {
        if query.location.trim().is_empty() {
            return Err(ForecastError::invalid("location must not be empty"));
        }
        if query.fields.is_empty() {
            return Err(ForecastError::invalid("at least one field is required"));
        }
        if query.timesteps.is_empty() {
            return Err(ForecastError::invalid("at least one timestep is required"));
        }
        if self.api_key.expose().is_empty() {
            return Err(ForecastError::invalid("no API key configured"));
        }

        let start = query.start_time.unwrap_or(now);
        let lookahead = Duration::seconds(DEFAULT_LOOKAHEAD_SECS);
        let end = query.end_time.unwrap_or(now + lookahead);
        if start > end {
            return Err(ForecastError::invalid(format!(
                "startTime {} is after endTime {}",
                iso8601(start),
                iso8601(end)
            )));
        }

        let units = Units::resolve(query.units, &self.host);
        let timezone = query.timezone.as_deref().unwrap_or(&self.host.timezone);

        let mut params: Vec<(&str, String)> = vec![
            ("location", query.location.clone()),
            ("fields", query.fields.to_string()),
        ];
        if let Some(units) = units.wire_value() {
            params.push(("units", units.to_string()));
        }
        params.extend([
            ("timesteps", Timestep::join(&query.timesteps)),
            ("startTime", iso8601(start)),
            ("endTime", iso8601(end)),
            ("timezone", timezone.to_string()),
            ("apikey", self.api_key.expose().to_string()),
        ]);

        let url = Url::parse_with_params(&self.endpoint, &params).map_err(|e| {
            ForecastError::invalid(format!("malformed request URL '{}': {e}", self.endpoint))
        })?;

        let descriptor = RequestDescriptor {
            method: Method::GET,
            url,
        };
        tracing::debug!(url = %descriptor.redacted_url(), "built timelines request");
        Ok(descriptor)
    }
}

/// Strict ISO-8601 in UTC with second precision, e.g. `2021-12-20T10:15:30Z`.
pub fn iso8601(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn builder() -> RequestBuilder {
        RequestBuilder::new(
            TIMELINES_ENDPOINT,
            ApiKey::new("test-key"),
            HostDefaults {
                prefers_metric: true,
                timezone: "Europe/Zurich".into(),
            },
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 12, 20, 10, 15, 30).unwrap()
    }

    fn query() -> WeatherQuery {
        WeatherQuery::new(
            "37.3333,-122.0068",
            FieldSet::parse("temperature,weatherCode"),
        )
    }

    fn rejected(builder: &RequestBuilder, query: &WeatherQuery) -> bool {
        matches!(
            builder.build_at(query, now()),
            Err(ForecastError::InvalidRequest(_))
        )
    }

    #[test]
    fn params_roundtrip_to_supplied_values() {
        let start = Utc.with_ymd_and_hms(2021, 12, 20, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2021, 12, 25, 0, 0, 0).unwrap();
        let q = WeatherQuery::new("New York, NY & co", FieldSet::parse("temperature,humidity"))
            .units(Some(Units::Imperial))
            .timesteps([Timestep::Current, Timestep::OneDay, Timestep::OneHour])
            .window(start, end)
            .timezone("America/New_York");

        let req = builder().build_at(&q, now()).unwrap();
        let param = |name: &str| req.param(name);

        assert_eq!(req.method, Method::GET);
        assert_eq!(param("location").as_deref(), Some("New York, NY & co"));
        assert_eq!(param("fields").as_deref(), Some("temperature,humidity"));
        assert_eq!(param("units").as_deref(), Some("imperial"));
        assert_eq!(param("timesteps").as_deref(), Some("current,1d,1h"));
        assert_eq!(param("startTime").as_deref(), Some("2021-12-20T00:00:00Z"));
        assert_eq!(param("endTime").as_deref(), Some("2021-12-25T00:00:00Z"));
        assert_eq!(param("timezone").as_deref(), Some("America/New_York"));
        assert_eq!(param("apikey").as_deref(), Some("test-key"));
    }

    #[test]
    fn params_are_in_upstream_order() {
        let req = builder().build_at(&query(), now()).unwrap();
        let keys: Vec<String> = req
            .url
            .query_pairs()
            .map(|(k, _)| k.into_owned())
            .collect();
        assert_eq!(
            keys,
            [
                "location",
                "fields",
                "units",
                "timesteps",
                "startTime",
                "endTime",
                "timezone",
                "apikey",
            ]
        );
        let url = req.url.as_str();
        assert!(url.starts_with("https://api.tomorrow.io/v4/timelines?"));
    }

    #[test]
    fn host_default_units_omit_parameter() {
        let q = query().units(Some(Units::HostDefault));
        let req = builder().build_at(&q, now()).unwrap();
        assert!(req.url.query_pairs().all(|(k, _)| k != "units"));
        assert!(!req.url.as_str().contains("units="));
    }

    #[test]
    fn unset_units_resolve_from_host() {
        let req = builder().build_at(&query(), now()).unwrap();
        assert_eq!(req.param("units").as_deref(), Some("metric"));

        let imperial_host = RequestBuilder::new(
            TIMELINES_ENDPOINT,
            ApiKey::new("k"),
            HostDefaults {
                prefers_metric: false,
                timezone: "UTC".into(),
            },
        );
        let req = imperial_host.build_at(&query(), now()).unwrap();
        assert_eq!(req.param("units").as_deref(), Some("imperial"));
    }

    #[test]
    fn defaults_fill_window_and_timezone() {
        let req = builder().build_at(&query(), now()).unwrap();
        let param = |name: &str| req.param(name);
        assert_eq!(param("startTime").as_deref(), Some("2021-12-20T10:15:30Z"));
        assert_eq!(param("endTime").as_deref(), Some("2021-12-20T10:16:30Z"));
        assert_eq!(param("timezone").as_deref(), Some("Europe/Zurich"));
        assert_eq!(param("timesteps").as_deref(), Some("current"));
    }

    #[test]
    fn build_is_idempotent() {
        let a = builder().build_at(&query(), now()).unwrap();
        let b = builder().build_at(&query(), now()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.url.as_str(), b.url.as_str());
    }

    #[test]
    fn rejects_invalid_queries() {
        let b = builder();

        let empty_location = WeatherQuery::new("  ", FieldSet::parse("temperature"));
        assert!(rejected(&b, &empty_location));

        let no_fields = WeatherQuery::new("here", FieldSet::parse(""));
        assert!(rejected(&b, &no_fields));

        let no_timesteps = query().timesteps(Vec::<Timestep>::new());
        assert!(rejected(&b, &no_timesteps));

        let backwards = query().window(now(), now() - Duration::hours(1));
        assert!(rejected(&b, &backwards));
    }

    #[test]
    fn missing_api_key_is_invalid() {
        let b = RequestBuilder::new(
            TIMELINES_ENDPOINT,
            ApiKey::new(""),
            HostDefaults::default(),
        );
        let err = b.build_at(&query(), now()).unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn malformed_endpoint_is_invalid_request() {
        let b = RequestBuilder::new("not a url", ApiKey::new("k"), HostDefaults::default());
        assert!(rejected(&b, &query()));
    }

    #[test]
    fn redacted_url_masks_key_only() {
        let req = builder().build_at(&query(), now()).unwrap();
        let redacted = req.redacted_url();
        assert!(!redacted.contains("test-key"));
        assert!(redacted.contains("apikey=***") || redacted.contains("apikey=%2A%2A%2A"));
        assert!(redacted.contains("timesteps=current"));
    }

    #[test]
    fn timestep_list_parsing_keeps_order() {
        assert_eq!(
            Timestep::parse_list("current,1d,1h").unwrap(),
            vec![Timestep::Current, Timestep::OneDay, Timestep::OneHour]
        );
        assert!(Timestep::parse_list("current,30m").is_err());
    }

    #[test]
    fn coordinates_render_as_lat_long() {
        let c: Coordinates = "37.3333,-122.0068".parse().unwrap();
        assert_eq!(c, Coordinates::new(37.3333, -122.0068));
        assert_eq!(c.to_string(), "37.3333,-122.0068");
        assert!("91,0".parse::<Coordinates>().is_err());
        assert!("Zurich".parse::<Coordinates>().is_err());
    }

    #[test]
    fn api_key_debug_is_masked() {
        assert_eq!(format!("{:?}", ApiKey::new("secret")), "ApiKey(***)");
    }
}
