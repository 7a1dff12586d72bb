//! Visual theme classification from current conditions.
//!
//! Time-of-day "magic hour" themes take precedence over weather-family themes;
//! the checks run in a fixed priority order so at most one window applies.

use crate::model::CurrentConditions;

const MAGIC_HOUR_SECS: i64 = 45 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherFamily {
    Clear,
    FewClouds,
    ScatteredClouds,
    BrokenClouds,
    Rain,
    Storm,
    Snow,
    Fog,
}

impl WeatherFamily {
    fn slug(self) -> &'static str {
        match self {
            WeatherFamily::Clear => "clear",
            WeatherFamily::FewClouds => "few-clouds",
            WeatherFamily::ScatteredClouds => "scattered-clouds",
            WeatherFamily::BrokenClouds => "broken-clouds",
            WeatherFamily::Rain => "rain",
            WeatherFamily::Storm => "storm",
            WeatherFamily::Snow => "snow",
            WeatherFamily::Fog => "fog",
        }
    }

    /// Classify by the leading two digits of an icon code ("10n" -> 10).
    /// Unrecognized codes fall back to clear.
    fn from_icon_code(code: &str) -> Self {
        let leading: u32 = code
            .get(..2)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        match leading {
            1 => WeatherFamily::Clear,
            2 => WeatherFamily::FewClouds,
            3 => WeatherFamily::ScatteredClouds,
            4 => WeatherFamily::BrokenClouds,
            9 | 10 => WeatherFamily::Rain,
            11 => WeatherFamily::Storm,
            13 => WeatherFamily::Snow,
            50 => WeatherFamily::Fog,
            _ => WeatherFamily::Clear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Up to 45 minutes before sunrise.
    Dawn,
    /// Up to 45 minutes after sunrise.
    Sunrise,
    /// Up to 45 minutes before sunset.
    Sunset,
    Weather { family: WeatherFamily, day: bool },
}

impl Theme {
    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dawn | Theme::Weather { day: false, .. })
    }

    /// The CSS class string the presentation layer applies to the page body.
    pub fn class_name(&self) -> String {
        match self {
            Theme::Dawn => "theme-dawn dark".to_string(),
            Theme::Sunrise => "theme-sunrise".to_string(),
            Theme::Sunset => "theme-sunset".to_string(),
            Theme::Weather { family, day } => {
                let suffix = if *day { "-day" } else { "-night dark" };
                format!("theme-{}{suffix}", family.slug())
            }
        }
    }
}

/// Derive the theme for the given observation. Pure; re-evaluated on every
/// successful fetch cycle.
pub fn resolve_theme(current: &CurrentConditions) -> Theme {
    let now = current.observed_at;
    let sunrise = current.sunrise;
    let sunset = current.sunset;

    if now >= sunrise - MAGIC_HOUR_SECS && now < sunrise {
        return Theme::Dawn;
    }
    if now >= sunrise && now <= sunrise + MAGIC_HOUR_SECS {
        return Theme::Sunrise;
    }
    if now >= sunset - MAGIC_HOUR_SECS && now <= sunset {
        return Theme::Sunset;
    }

    let day = now > sunrise && now < sunset;
    Theme::Weather {
        family: WeatherFamily::from_icon_code(&current.icon_code),
        day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUNRISE: i64 = 1_700_000_000;
    const SUNSET: i64 = SUNRISE + 10 * 3600;

    fn conditions(observed_at: i64, icon: &str) -> CurrentConditions {
        CurrentConditions {
            temperature: 18.0,
            feels_like: 17.0,
            humidity: 60.0,
            wind_speed: 3.0,
            wind_deg: 200.0,
            pressure: 1013.0,
            uv_index: None,
            icon_code: icon.to_string(),
            description: "test".to_string(),
            sunrise: SUNRISE,
            sunset: SUNSET,
            timezone_offset: 0,
            observed_at,
        }
    }

    #[test]
    fn dawn_window_before_sunrise() {
        assert_eq!(resolve_theme(&conditions(SUNRISE - 1, "01d")), Theme::Dawn);
        assert_eq!(
            resolve_theme(&conditions(SUNRISE - 45 * 60, "01d")),
            Theme::Dawn
        );
    }

    #[test]
    fn sunrise_window_starts_at_sunrise() {
        // The instant of sunrise belongs to the sunrise window, not dawn.
        assert_eq!(resolve_theme(&conditions(SUNRISE, "01d")), Theme::Sunrise);
        assert_eq!(
            resolve_theme(&conditions(SUNRISE + 45 * 60, "01d")),
            Theme::Sunrise
        );
    }

    #[test]
    fn sunset_window_before_sunset() {
        assert_eq!(
            resolve_theme(&conditions(SUNSET - 45 * 60, "01d")),
            Theme::Sunset
        );
        assert_eq!(resolve_theme(&conditions(SUNSET, "01d")), Theme::Sunset);
    }

    #[test]
    fn windows_are_disjoint_by_priority() {
        // One window per timestamp even when boundaries touch.
        for ts in [
            SUNRISE - 45 * 60,
            SUNRISE - 1,
            SUNRISE,
            SUNRISE + 45 * 60,
            SUNSET - 45 * 60,
            SUNSET,
        ] {
            let theme = resolve_theme(&conditions(ts, "01d"));
            assert!(matches!(
                theme,
                Theme::Dawn | Theme::Sunrise | Theme::Sunset
            ));
        }
    }

    #[test]
    fn midday_uses_weather_family() {
        let noon = SUNRISE + 5 * 3600;
        assert_eq!(
            resolve_theme(&conditions(noon, "10d")),
            Theme::Weather { family: WeatherFamily::Rain, day: true }
        );
        assert_eq!(
            resolve_theme(&conditions(noon, "11d")),
            Theme::Weather { family: WeatherFamily::Storm, day: true }
        );
    }

    #[test]
    fn night_is_dark() {
        let night = SUNSET + 2 * 3600;
        let theme = resolve_theme(&conditions(night, "01n"));
        assert_eq!(
            theme,
            Theme::Weather { family: WeatherFamily::Clear, day: false }
        );
        assert!(theme.is_dark());
        assert_eq!(theme.class_name(), "theme-clear-night dark");
    }

    #[test]
    fn unrecognized_code_defaults_to_clear() {
        let noon = SUNRISE + 5 * 3600;
        assert_eq!(
            resolve_theme(&conditions(noon, "zz")),
            Theme::Weather { family: WeatherFamily::Clear, day: true }
        );
    }

    #[test]
    fn class_names_match_stylesheet() {
        assert_eq!(Theme::Dawn.class_name(), "theme-dawn dark");
        assert_eq!(Theme::Sunrise.class_name(), "theme-sunrise");
        assert_eq!(
            Theme::Weather { family: WeatherFamily::FewClouds, day: true }.class_name(),
            "theme-few-clouds-day"
        );
        assert_eq!(
            Theme::Weather { family: WeatherFamily::Fog, day: false }.class_name(),
            "theme-fog-night dark"
        );
    }
}
