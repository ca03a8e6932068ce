//! Host locale and timezone detection.
//!
//! The core never reads these itself; the CLI detects them once and injects
//! the result as [`HostDefaults`].

use forecast_core::HostDefaults;

/// Regions whose locales default to imperial units.
const IMPERIAL_REGIONS: &[&str] = &["US", "LR", "MM"];

pub fn detect() -> HostDefaults {
    detect_with(|key| std::env::var(key).ok())
}

pub fn detect_with(lookup: impl Fn(&str) -> Option<String>) -> HostDefaults {
    let locale = ["LC_ALL", "LC_MEASUREMENT", "LANG"]
        .iter()
        .find_map(|key| lookup(key).filter(|v| !v.is_empty()));

    let prefers_metric = locale.as_deref().is_none_or(|l| !uses_imperial(l));

    let timezone = lookup("TZ")
        .map(|tz| tz.trim_start_matches(':').to_string())
        .filter(|tz| !tz.is_empty())
        .unwrap_or_else(|| "UTC".to_string());

    tracing::debug!(?locale, prefers_metric, %timezone, "detected host defaults");
    HostDefaults {
        prefers_metric,
        timezone,
    }
}

/// `en_US.UTF-8` → region `US`.
fn uses_imperial(locale: &str) -> bool {
    let name = locale.split(['.', '@']).next().unwrap_or_default();
    name.split(['_', '-'])
        .nth(1)
        .is_some_and(|region| IMPERIAL_REGIONS.contains(&region.to_uppercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn us_locale_prefers_imperial() {
        let host = detect_with(env(&[("LANG", "en_US.UTF-8")]));
        assert!(!host.prefers_metric);
    }

    #[test]
    fn other_locales_prefer_metric() {
        assert!(detect_with(env(&[("LANG", "de_CH.UTF-8")])).prefers_metric);
        assert!(detect_with(env(&[("LANG", "C")])).prefers_metric);
        assert!(detect_with(env(&[])).prefers_metric);
    }

    #[test]
    fn lc_all_wins_over_lang() {
        let host = detect_with(env(&[("LC_ALL", "en_GB.UTF-8"), ("LANG", "en_US.UTF-8")]));
        assert!(host.prefers_metric);
    }

    #[test]
    fn timezone_from_tz_or_utc() {
        let host = detect_with(env(&[("TZ", ":Europe/Zurich")]));
        assert_eq!(host.timezone, "Europe/Zurich");
        assert_eq!(detect_with(env(&[])).timezone, "UTC");
    }
}
