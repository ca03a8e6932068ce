//! Human-readable classification of decoded metrics.

/// tomorrow.io weather condition codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherCode {
    Clear,
    MostlyClear,
    PartlyCloudy,
    MostlyCloudy,
    Cloudy,
    Fog,
    LightFog,
    Drizzle,
    Rain,
    LightRain,
    HeavyRain,
    Snow,
    Flurries,
    LightSnow,
    HeavySnow,
    FreezingDrizzle,
    FreezingRain,
    LightFreezingRain,
    HeavyFreezingRain,
    IcePellets,
    HeavyIcePellets,
    LightIcePellets,
    Thunderstorm,
}

impl WeatherCode {
    /// `None` for codes this client does not know.
    pub fn from_code(code: i32) -> Option<Self> {
        let code = match code {
            1000 => Self::Clear,
            1100 => Self::MostlyClear,
            1101 => Self::PartlyCloudy,
            1102 => Self::MostlyCloudy,
            1001 => Self::Cloudy,
            2000 => Self::Fog,
            2100 => Self::LightFog,
            4000 => Self::Drizzle,
            4001 => Self::Rain,
            4200 => Self::LightRain,
            4201 => Self::HeavyRain,
            5000 => Self::Snow,
            5001 => Self::Flurries,
            5100 => Self::LightSnow,
            5101 => Self::HeavySnow,
            6000 => Self::FreezingDrizzle,
            6001 => Self::FreezingRain,
            6200 => Self::LightFreezingRain,
            6201 => Self::HeavyFreezingRain,
            7000 => Self::IcePellets,
            7101 => Self::HeavyIcePellets,
            7102 => Self::LightIcePellets,
            8000 => Self::Thunderstorm,
            _ => return None,
        };
        Some(code)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::MostlyClear => "Mostly Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::MostlyCloudy => "Mostly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::LightFog => "Light Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::LightRain => "Light Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Flurries => "Flurries",
            Self::LightSnow => "Light Snow",
            Self::HeavySnow => "Heavy Snow",
            Self::FreezingDrizzle => "Freezing Drizzle",
            Self::FreezingRain => "Freezing Rain",
            Self::LightFreezingRain => "Light Freezing Rain",
            Self::HeavyFreezingRain => "Heavy Freezing Rain",
            Self::IcePellets => "Ice Pellets",
            Self::HeavyIcePellets => "Heavy Ice Pellets",
            Self::LightIcePellets => "Light Ice Pellets",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    /// Icon name; clear and partly cloudy skies differ between day and night.
    pub fn icon_name(self, daytime: bool) -> &'static str {
        match self {
            Self::HeavyRain => "cloud.heavyrain.fill",
            Self::Rain => "cloud.rain.fill",
            Self::LightRain | Self::Drizzle => "cloud.drizzle.fill",
            Self::HeavyFreezingRain
            | Self::FreezingRain
            | Self::LightFreezingRain
            | Self::FreezingDrizzle => "cloud.sleet.fill",
            Self::HeavyIcePellets | Self::IcePellets | Self::LightIcePellets => "cloud.hail.fill",
            Self::HeavySnow | Self::Snow | Self::LightSnow | Self::Flurries => "cloud.snow.fill",
            Self::Thunderstorm => "cloud.bolt.rain.fill",
            Self::LightFog | Self::Fog => "cloud.fog.fill",
            Self::Cloudy | Self::MostlyCloudy => "cloud.fill",
            Self::PartlyCloudy if daytime => "cloud.sun.fill",
            Self::PartlyCloudy => "cloud.moon.fill",
            Self::MostlyClear | Self::Clear if daytime => "sun.max.fill",
            Self::MostlyClear | Self::Clear => "moon.stars.fill",
        }
    }
}

/// Kind of precipitation reported by `precipitationType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrecipitationType {
    Rain,
    Snow,
    FreezingRain,
    IcePellets,
}

impl PrecipitationType {
    /// `0` (none) is reported as rain, matching the accumulation it reads.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 | 1 => Some(Self::Rain),
            2 => Some(Self::Snow),
            3 => Some(Self::FreezingRain),
            4 => Some(Self::IcePellets),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::FreezingRain => "freezing rain",
            Self::IcePellets => "ice pellets",
        }
    }

    /// Accumulation relevant to this kind of precipitation.
    pub fn accumulation(self, values: &crate::MetricValues) -> Option<f64> {
        match self {
            Self::Rain => values.rain_accumulation,
            Self::Snow => values.snow_accumulation,
            Self::FreezingRain | Self::IcePellets => values.ice_accumulation,
        }
    }
}

pub fn uv_level(index: i32) -> &'static str {
    match index {
        i32::MIN..=2 => "low",
        3..=5 => "moderate",
        6..=7 => "high",
        8..=10 => "very high",
        _ => "extreme",
    }
}

/// EPA air quality band for an `epaIndex` value.
pub fn air_quality(index: i32) -> &'static str {
    match index {
        i32::MIN..=50 => "good",
        51..=100 => "moderate",
        101..=150 => "unhealthy for sensitive groups",
        151..=200 => "unhealthy",
        201..=300 => "very unhealthy",
        _ => "hazardous",
    }
}

pub fn pollen_level(index: i32) -> &'static str {
    match index {
        i32::MIN..=0 => "none",
        1 => "very low",
        2 => "low",
        3 => "medium",
        4 => "high",
        _ => "very high",
    }
}

/// Highest pollen index and the sources that reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DominantPollen {
    pub index: i32,
    pub sources: &'static str,
}

pub fn dominant_pollen(tree: i32, grass: i32, weed: i32) -> DominantPollen {
    let index = tree.max(grass).max(weed);
    let sources = match (tree == index, grass == index, weed == index) {
        (true, true, true) => "Tree, grass, and weed",
        (true, true, false) => "Tree and grass",
        (true, false, true) => "Tree and weed",
        (false, true, true) => "Grass and weed",
        (true, false, false) => "Tree",
        (false, true, false) => "Grass",
        _ => "Weed",
    };
    DominantPollen { index, sources }
}

/// Fog and mist bands for a `visibility` reading in km, or miles when not
/// `metric`.
pub fn visibility_concern(visibility: f64, metric: bool) -> &'static str {
    let km = if metric {
        visibility
    } else {
        visibility * 1.609
    };
    if km < 0.04572 {
        "Visibility is poor. There may be dense fog."
    } else if km < 0.185623 {
        "Visibility is poor. There may be thick fog."
    } else if km < 0.370332 {
        "Visibility is poor. There may be fog."
    } else if km < 0.926 {
        "Visibility is low. There may be moderate fog."
    } else if km < 3.704 {
        "Visibility is low. There may be thin fog or mist."
    } else if km < 9.26 {
        "Visibility is moderate. There may be thin fog or mist."
    } else if km < 12.8748 {
        "Visibility is moderate. It is almost clear right now."
    } else if km < 14.0 {
        "Visibility is good. It is clear right now."
    } else {
        "Visibility is high. It is perfectly clear right now."
    }
}

/// Surface pressure band for a reading in hPa, or inHg when not `metric`.
pub fn pressure_level(pressure: f64, metric: bool) -> &'static str {
    let hpa = if metric { pressure } else { pressure * 33.864 };
    if hpa < 996.27555 {
        "low"
    } else if hpa < 1030.1394 {
        "normal"
    } else {
        "high"
    }
}

/// Eight-point compass direction the wind is blowing from.
pub fn compass_direction(degrees: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized + 22.5) / 45.0) as usize % POINTS.len();
    POINTS[index]
}
