use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit system requested from upstream.
///
/// Persisted as an integer: `0` imperial, `1` metric, `2` host default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Units {
    Imperial,
    Metric,
    /// Leave the choice to upstream: the `units` parameter is omitted.
    HostDefault,
}

impl Units {
    pub const fn all() -> &'static [Units] {
        &[Units::Imperial, Units::Metric, Units::HostDefault]
    }

    pub const fn code(self) -> u8 {
        match self {
            Units::Imperial => 0,
            Units::Metric => 1,
            Units::HostDefault => 2,
        }
    }

    /// Wire value of the `units` query parameter, `None` when it must be omitted.
    pub const fn wire_value(self) -> Option<&'static str> {
        match self {
            Units::Imperial => Some("imperial"),
            Units::Metric => Some("metric"),
            Units::HostDefault => None,
        }
    }

    /// Resolve an unset preference from the host locale.
    pub fn resolve(units: Option<Units>, host: &HostDefaults) -> Units {
        let fallback = if host.prefers_metric {
            Units::Metric
        } else {
            Units::Imperial
        };
        units.unwrap_or(fallback)
    }

    /// Whether values coming back are expected in metric units.
    pub fn is_metric(self, host: &HostDefaults) -> bool {
        match self {
            Units::Metric => true,
            Units::Imperial => false,
            Units::HostDefault => host.prefers_metric,
        }
    }
}

impl TryFrom<u8> for Units {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Units::Imperial),
            1 => Ok(Units::Metric),
            2 => Ok(Units::HostDefault),
            other => Err(format!("unknown units preference {other}, expected 0, 1 or 2")),
        }
    }
}

impl From<Units> for u8 {
    fn from(units: Units) -> Self {
        units.code()
    }
}

impl TryFrom<&str> for Units {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "imperial" => Ok(Units::Imperial),
            "metric" => Ok(Units::Metric),
            "system" | "default" | "host" => Ok(Units::HostDefault),
            _ => Err(format!(
                "Unknown units '{value}'. Supported units: imperial, metric, system."
            )),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_value().unwrap_or("system"))
    }
}

/// Host facts the query builder would otherwise read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDefaults {
    /// Whether the host locale prefers metric units.
    pub prefers_metric: bool,
    /// IANA timezone identifier of the host.
    pub timezone: String,
}

impl Default for HostDefaults {
    fn default() -> Self {
        Self {
            prefers_metric: true,
            timezone: "UTC".to_string(),
        }
    }
}
