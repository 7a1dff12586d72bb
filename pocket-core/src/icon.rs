//! Mapping from standard-provider icon codes to the AccuWeather icon set the
//! renderer uses.

const ICON_BASE: &str = "https://developer.accuweather.com/sites/default/files";
const PLACEHOLDER_URL: &str = "https://placehold.co/64x64/e2e8f0/a0aec0?text=Icon";

/// Canonical icon reference produced by [`map_icon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconRef {
    /// An AccuWeather asset id, 1..=44.
    Known(u8),
    Placeholder,
}

impl IconRef {
    pub fn asset_id(&self) -> Option<u8> {
        match self {
            IconRef::Known(id) => Some(*id),
            IconRef::Placeholder => None,
        }
    }

    pub fn url(&self) -> String {
        match self {
            IconRef::Known(id) => format!("{ICON_BASE}/{id:02}-s.png"),
            IconRef::Placeholder => PLACEHOLDER_URL.to_string(),
        }
    }
}

/// Map a standard-provider day/night icon code to an [`IconRef`].
///
/// Unknown or missing codes map to the placeholder; this never fails.
pub fn map_icon(code: Option<&str>) -> IconRef {
    let Some(code) = code else {
        return IconRef::Placeholder;
    };

    let id = match code {
        "01d" => 1,
        "01n" => 33,
        "02d" => 3,
        "02n" => 35,
        "03d" => 6,
        "03n" => 38,
        "04d" | "04n" => 7,
        "09d" => 12,
        "09n" => 39,
        "10d" => 18,
        "10n" => 40,
        "11d" => 15,
        "11n" => 41,
        "13d" => 22,
        "13n" => 44,
        "50d" | "50n" => 11,
        _ => return IconRef::Placeholder,
    };

    IconRef::Known(id)
}
