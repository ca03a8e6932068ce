//! Strict decoding of timelines responses.
//!
//! The body is parsed once into a JSON tree and then walked level by level so
//! a failure can name the offending field and its path. Unknown fields are
//! ignored. Any failure rejects the whole body.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{ForecastError, Interval, MetricValues, Timeline, Timestep, WeatherResult};

/// Metrics every interval must carry with a non-null value.
const REQUIRED_METRICS: &[&str] = &["temperature", "weatherCode"];

const FLOAT_METRICS: &[&str] = &[
    "temperature",
    "dewPoint",
    "humidity",
    "windSpeed",
    "windDirection",
    "windGust",
    "pressureSurfaceLevel",
    "precipitationProbability",
    "rainAccumulation",
    "snowAccumulation",
    "iceAccumulation",
    "visibility",
];

const INT_METRICS: &[&str] = &[
    "precipitationType",
    "uvIndex",
    "weatherCode",
    "epaIndex",
    "epaHealthConcern",
    "treeIndex",
    "grassIndex",
    "weedIndex",
];

/// Decode a response body into a [`WeatherResult`].
pub fn decode_weather(body: &[u8]) -> Result<WeatherResult, ForecastError> {
    let root: Value = serde_json::from_slice(body)
        .map_err(|e| ForecastError::decode("body", format!("not valid JSON: {e}")))?;

    let root = object(&root, "", "body")?;
    let data = object(member(root, "data", "")?, "data", "data")?;
    let timelines = member(data, "timelines", "data")?
        .as_array()
        .ok_or_else(|| ForecastError::decode("timelines", "expected an array at data.timelines"))?;

    let timelines = timelines
        .iter()
        .enumerate()
        .map(|(i, t)| decode_timeline(t, &format!("data.timelines[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WeatherResult { timelines })
}

fn decode_timeline(value: &Value, path: &str) -> Result<Timeline, ForecastError> {
    let obj = object(value, path, "timelines")?;

    let timestep: Timestep = field(obj, "timestep", path)?;
    let start_time: DateTime<FixedOffset> = field(obj, "startTime", path)?;
    let end_time: DateTime<FixedOffset> = field(obj, "endTime", path)?;

    let intervals = member(obj, "intervals", path)?
        .as_array()
        .ok_or_else(|| {
            let reason = format!("expected an array at {path}.intervals");
            ForecastError::decode("intervals", reason)
        })?
        .iter()
        .enumerate()
        .map(|(j, v)| decode_interval(v, &format!("{path}.intervals[{j}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Timeline {
        timestep,
        start_time,
        end_time,
        intervals,
    })
}

fn decode_interval(value: &Value, path: &str) -> Result<Interval, ForecastError> {
    let obj = object(value, path, "intervals")?;
    let start_time: DateTime<FixedOffset> = field(obj, "startTime", path)?;

    let values = member(obj, "values", path)?;
    let values_path = format!("{path}.values");
    let values = MetricValues::deserialize(values)
        .map_err(|e| metric_error(values, &e, &values_path))?;

    Ok(Interval { start_time, values })
}

fn object<'a>(
    value: &'a Value,
    path: &str,
    name: &str,
) -> Result<&'a Map<String, Value>, ForecastError> {
    value.as_object().ok_or_else(|| {
        let at = if path.is_empty() { "top level" } else { path };
        let reason = format!("expected an object at {at}, found {}", kind(value));
        ForecastError::decode(name, reason)
    })
}

fn member<'a>(
    obj: &'a Map<String, Value>,
    name: &str,
    path: &str,
) -> Result<&'a Value, ForecastError> {
    obj.get(name).ok_or_else(|| {
        ForecastError::decode(name, format!("missing field at {}", join(path, name)))
    })
}

fn field<'a, T: Deserialize<'a>>(
    obj: &'a Map<String, Value>,
    name: &str,
    path: &str,
) -> Result<T, ForecastError> {
    let value = member(obj, name, path)?;
    T::deserialize(value)
        .map_err(|e| ForecastError::decode(name, format!("{e} at {}", join(path, name))))
}

fn metric_error(values: &Value, err: &serde_json::Error, path: &str) -> ForecastError {
    let msg = err.to_string();
    let field = missing_field(&msg)
        .or_else(|| mistyped_metric(values))
        .unwrap_or_else(|| "values".to_string());
    ForecastError::decode(field, format!("{msg} at {path}"))
}

/// Field name out of serde's "missing field `name`" message.
fn missing_field(msg: &str) -> Option<String> {
    let rest = msg.strip_prefix("missing field `")?;
    rest.split('`').next().map(str::to_string)
}

/// First known metric whose value has the wrong JSON type. Required metrics
/// are checked first.
fn mistyped_metric(values: &Value) -> Option<String> {
    let obj = values.as_object()?;
    REQUIRED_METRICS
        .iter()
        .chain(FLOAT_METRICS)
        .chain(INT_METRICS)
        .find(|name| obj.get(**name).is_some_and(|v| !accepts_metric(name, v)))
        .map(|name| name.to_string())
}

/// `null` is only accepted for optional metrics.
fn accepts_metric(name: &str, value: &Value) -> bool {
    if value.is_null() {
        return !REQUIRED_METRICS.contains(&name);
    }
    if INT_METRICS.contains(&name) {
        i32::deserialize(value).is_ok()
    } else {
        f64::deserialize(value).is_ok()
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
