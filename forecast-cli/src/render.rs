//! Plain-text rendering of fetched forecasts.

use chrono::{DateTime, Duration, TimeZone, Timelike};
use forecast_core::{
    DailyExtreme, ForecastView, MetricValues, Timeline, Timestep, WeatherResult,
    conditions::{self, PrecipitationType, WeatherCode},
};
use std::fmt;

/// Unit labels for the unit system the values came back in.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub metric: bool,
    pub temperature: &'static str,
    pub speed: &'static str,
    pub distance: &'static str,
    pub precipitation: &'static str,
    pub pressure: &'static str,
}

impl Labels {
    pub fn new(metric: bool) -> Self {
        if metric {
            Self {
                metric,
                temperature: "°C",
                speed: "m/s",
                distance: "km",
                precipitation: "mm",
                pressure: "hPa",
            }
        } else {
            Self {
                metric,
                temperature: "°F",
                speed: "mph",
                distance: "mi",
                precipitation: "in",
                pressure: "inHg",
            }
        }
    }
}

/// Rounded half away from zero; `-0.3` shows as `0`.
fn whole(value: f64) -> i32 {
    value.round() as i32
}

fn condition(code: i32, daytime: bool) -> String {
    WeatherCode::from_code(code)
        .map(|c| format!("{} ({})", c.description(), c.icon_name(daytime)))
        .unwrap_or_else(|| format!("Unknown condition {code}"))
}

fn is_daytime<Tz: TimeZone>(now: &DateTime<Tz>) -> bool {
    (6..18).contains(&now.hour())
}

fn weekday<Tz: TimeZone>(now: &DateTime<Tz>, offset: usize) -> String
where
    Tz::Offset: fmt::Display,
{
    let day = now.clone() + Duration::days(offset as i64);
    day.format("%a").to_string()
}

fn timeline(result: &WeatherResult, view: ForecastView, step: Timestep) -> Option<&Timeline> {
    result.timeline(view.timeline_index(step)?)
}

fn current_values(result: &WeatherResult, view: ForecastView) -> Option<&MetricValues> {
    let current = timeline(result, view, Timestep::Current)?.current()?;
    Some(&current.values)
}

fn extremes<Tz: TimeZone>(
    result: &WeatherResult,
    view: ForecastView,
    now: &DateTime<Tz>,
) -> Vec<DailyExtreme> {
    match timeline(result, view, Timestep::OneHour) {
        Some(hourly) => hourly.daily_extremes(view.extreme_days(), now),
        None => vec![DailyExtreme::default(); view.extreme_days()],
    }
}

/// One-line summary used for saved locations.
pub fn card<Tz: TimeZone>(
    title: &str,
    result: &WeatherResult,
    now: &DateTime<Tz>,
    labels: Labels,
) -> String {
    let view = ForecastView::List;
    let today = extremes(result, view, now)
        .first()
        .copied()
        .unwrap_or_default();
    match current_values(result, view) {
        Some(values) => format!(
            "{title}: {}{} {}  H: {}°  L: {}°",
            whole(values.temperature),
            labels.temperature,
            condition(values.weather_code, is_daytime(now)),
            today.high,
            today.low,
        ),
        None => format!("{title}: no current conditions"),
    }
}

/// Full detail screen, rendered through [`fmt::Display`].
pub struct Detail<'a, Tz: TimeZone> {
    title: &'a str,
    result: &'a WeatherResult,
    now: &'a DateTime<Tz>,
    labels: Labels,
}

pub fn detail<'a, Tz: TimeZone>(
    title: &'a str,
    result: &'a WeatherResult,
    now: &'a DateTime<Tz>,
    labels: Labels,
) -> Detail<'a, Tz> {
    Detail {
        title,
        result,
        now,
        labels,
    }
}

impl<Tz: TimeZone> fmt::Display for Detail<'_, Tz>
where
    Tz::Offset: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = ForecastView::Detail;
        let labels = self.labels;
        let highs_lows = extremes(self.result, view, self.now);
        let today = highs_lows.first().copied().unwrap_or_default();

        writeln!(f, "{}", self.title)?;
        let Some(current) = current_values(self.result, view) else {
            return writeln!(f, "No current conditions available.");
        };

        writeln!(
            f,
            "{}{}  {}",
            whole(current.temperature),
            labels.temperature,
            condition(current.weather_code, is_daytime(self.now))
        )?;
        writeln!(f, "H: {}°  L: {}°", today.high, today.low)?;
        writeln!(f)?;

        writeln!(f, "{}-Day Forecast", view.extreme_days())?;
        let daily = timeline(self.result, view, Timestep::OneDay);
        for (i, extreme) in highs_lows.iter().enumerate() {
            let label = if i == 0 {
                "Today".to_string()
            } else {
                weekday(self.now, i)
            };
            let day = daily.and_then(|t| t.intervals.get(i)).map(|d| &d.values);
            let precipitation = day
                .and_then(|v| v.precipitation_probability)
                .map(|p| format!("{}%", whole(p)))
                .unwrap_or_else(|| "--".to_string());
            let sky = day
                .and_then(|v| WeatherCode::from_code(v.weather_code))
                .map(|c| c.description())
                .unwrap_or("");
            let (high, low) = (extreme.high, extreme.low);
            writeln!(
                f,
                "  {label:<6} {precipitation:>4}  {high:>4}° {low:>4}°  {sky}"
            )?;
        }
        writeln!(f)?;

        if let Some(humidity) = current.humidity {
            write!(f, "Humidity: {}%", whole(humidity))?;
            if let Some(dew) = current.dew_point {
                write!(f, " (dew point {}°)", whole(dew))?;
            }
            writeln!(f)?;
        }
        if let Some(speed) = current.wind_speed {
            write!(f, "Wind: {} {}", whole(speed), labels.speed)?;
            if let Some(dir) = current.wind_direction {
                write!(f, " from {}", conditions::compass_direction(dir))?;
            }
            if let Some(gust) = current.wind_gust {
                write!(f, ", gusts up to {} {}", whole(gust), labels.speed)?;
            }
            writeln!(f)?;
        }
        if let Some(pressure) = current.pressure_surface_level {
            let level = conditions::pressure_level(pressure, labels.metric);
            let unit = labels.pressure;
            if labels.metric {
                writeln!(f, "Pressure: {} {unit} ({level})", whole(pressure))?;
            } else {
                writeln!(f, "Pressure: {pressure:.2} {unit} ({level})")?;
            }
        }
        if let Some(probability) = current.precipitation_probability {
            write!(f, "Precipitation: {}%", whole(probability))?;
            let kind = current
                .precipitation_type
                .and_then(PrecipitationType::from_code);
            if let Some(kind) = kind {
                let amount = whole(kind.accumulation(current).unwrap_or_default());
                let unit = labels.precipitation;
                write!(f, ", {amount} {unit} of {}", kind.as_str())?;
            }
            writeln!(f)?;
        }
        if let Some(visibility) = current.visibility {
            let concern = conditions::visibility_concern(visibility, labels.metric);
            let unit = labels.distance;
            writeln!(f, "Visibility: {} {unit}. {concern}", whole(visibility))?;
        }
        if let Some(uv) = current.uv_index {
            writeln!(f, "UV index: {uv} ({})", conditions::uv_level(uv))?;
        }
        if let Some(epa) = current.epa_index {
            writeln!(f, "Air quality: {epa} ({})", conditions::air_quality(epa))?;
        }
        let pollen = [
            current.tree_index,
            current.grass_index,
            current.weed_index,
        ];
        if pollen.iter().any(Option::is_some) {
            let [tree, grass, weed] = pollen.map(Option::unwrap_or_default);
            let dominant = conditions::dominant_pollen(tree, grass, weed);
            let level = conditions::pollen_level(dominant.index);
            writeln!(f, "Pollen: {level} ({})", dominant.sources)?;
        }
        Ok(())
    }
}
