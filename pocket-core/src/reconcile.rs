//! Merges whatever one provider fetch produced into the unified view model.
//!
//! The one rule that shapes everything here: numeric truth follows the active
//! provider, iconography always follows the standard provider. The advanced
//! upstream's own weather codes have no icon mapping, so its slots borrow
//! icons from the standard forecast list by timestamp proximity (hourly) or
//! calendar date (daily).

use chrono::{DateTime, NaiveDate};

use crate::model::{
    AdvancedPayload, AdvancedSlot, CurrentConditions, ForecastSlot, MAX_DAILY_SLOTS,
    MAX_HOURLY_SLOTS, ProviderData, StandardCurrent, StandardSlot, ViewModel,
};
use crate::provider::ProviderId;

/// Build the view model for one completed fetch. Pure; all network work has
/// already happened in the adapter.
pub fn build_view_model(data: ProviderData, active: ProviderId) -> ViewModel {
    let ProviderData {
        location,
        standard_current,
        standard_forecast,
        advanced,
        warnings,
    } = data;

    match (active, advanced) {
        (ProviderId::Advanced, Some(adv)) => ViewModel {
            location,
            current: merged_current(&standard_current, &adv),
            hourly: advanced_hourly(&adv.hourly, &standard_forecast),
            daily: advanced_daily(&adv.daily, &standard_forecast),
            warnings,
        },
        // The standard path, and the defensive fallback when the advanced
        // payload is absent.
        _ => ViewModel {
            location,
            current: standard_only_current(&standard_current),
            hourly: standard_hourly(&standard_forecast),
            daily: standard_daily(&standard_forecast, standard_current.observed_at),
            warnings,
        },
    }
}

fn standard_only_current(std: &StandardCurrent) -> CurrentConditions {
    CurrentConditions {
        temperature: std.temperature,
        feels_like: std.feels_like,
        humidity: std.humidity,
        wind_speed: std.wind_speed,
        wind_deg: std.wind_deg,
        pressure: std.pressure,
        uv_index: std.uv_index,
        icon_code: std.icon_code.clone(),
        description: std.description.clone(),
        sunrise: std.sunrise,
        sunset: std.sunset,
        timezone_offset: std.timezone_offset,
        observed_at: std.observed_at,
    }
}

/// Numeric fields from the advanced realtime payload, everything visual and
/// astronomical from the standard companion.
fn merged_current(std: &StandardCurrent, adv: &AdvancedPayload) -> CurrentConditions {
    CurrentConditions {
        temperature: adv.current.temperature,
        feels_like: adv.current.feels_like,
        humidity: adv.current.humidity,
        wind_speed: adv.current.wind_speed,
        wind_deg: adv.current.wind_deg,
        pressure: adv.current.pressure,
        uv_index: adv.current.uv_index,
        icon_code: std.icon_code.clone(),
        description: std.description.clone(),
        sunrise: std.sunrise,
        sunset: std.sunset,
        timezone_offset: std.timezone_offset,
        observed_at: std.observed_at,
    }
}

fn standard_hourly(forecast: &[StandardSlot]) -> Vec<ForecastSlot> {
    forecast
        .iter()
        .take(MAX_HOURLY_SLOTS)
        .map(|slot| ForecastSlot {
            timestamp: slot.timestamp,
            temperature: slot.temperature,
            icon_code: Some(slot.icon_code.clone()),
            precipitation_pct: Some((slot.pop_fraction * 100.0).round()),
            is_daily: false,
            temp_min: None,
            temp_max: None,
        })
        .collect()
}

fn advanced_hourly(hourly: &[AdvancedSlot], standard: &[StandardSlot]) -> Vec<ForecastSlot> {
    hourly
        .iter()
        .take(MAX_HOURLY_SLOTS)
        .map(|slot| ForecastSlot {
            timestamp: slot.timestamp,
            temperature: slot.temperature.unwrap_or(0.0),
            icon_code: nearest_icon(slot.timestamp, standard),
            precipitation_pct: slot.precipitation_pct.map(f64::round),
            is_daily: false,
            temp_min: None,
            temp_max: None,
        })
        .collect()
}

/// Borrow the icon of the standard slot with the smallest |Δt|. A linear scan
/// is fine at ≤16×≤40; `min_by_key` keeps the earliest slot on ties.
fn nearest_icon(timestamp: i64, standard: &[StandardSlot]) -> Option<String> {
    standard
        .iter()
        .min_by_key(|slot| (slot.timestamp - timestamp).abs())
        .map(|slot| slot.icon_code.clone())
}

/// Group the 3-hourly list into days, skipping the observation day entirely:
/// its slots are redundant with current conditions. "Today" is the UTC
/// calendar day of the observation timestamp, so the cut is independent of
/// the caller's clock and timezone.
fn standard_daily(forecast: &[StandardSlot], observed_at: i64) -> Vec<ForecastSlot> {
    let today = utc_day(observed_at);

    let mut days: Vec<(NaiveDate, DayAggregate)> = Vec::new();
    for slot in forecast {
        let day = utc_day(slot.timestamp);
        if day <= today {
            continue;
        }

        match days.iter_mut().find(|(d, _)| *d == day) {
            Some((_, agg)) => agg.add(slot),
            None => {
                let mut agg = DayAggregate::new(slot.timestamp);
                agg.add(slot);
                days.push((day, agg));
            }
        }
    }

    days.into_iter()
        .take(MAX_DAILY_SLOTS)
        .map(|(_, agg)| agg.into_slot())
        .collect()
}

/// The advanced daily cadence is used as given, no today-exclusion. Each day
/// borrows the most frequent standard icon sharing its UTC calendar date,
/// or none when the companion list has nothing for that date.
fn advanced_daily(daily: &[AdvancedSlot], standard: &[StandardSlot]) -> Vec<ForecastSlot> {
    daily
        .iter()
        .take(MAX_DAILY_SLOTS)
        .map(|slot| {
            let day = utc_day(slot.timestamp);
            let mut icons = IconTally::default();
            for std_slot in standard.iter().filter(|s| utc_day(s.timestamp) == day) {
                icons.add(&std_slot.icon_code);
            }

            ForecastSlot {
                timestamp: slot.timestamp,
                temperature: slot.temperature.or(slot.temp_max).unwrap_or(0.0),
                icon_code: icons.winner(),
                precipitation_pct: slot.precipitation_pct.map(f64::round),
                is_daily: true,
                temp_min: Some(slot.temp_min.unwrap_or(0.0)),
                temp_max: Some(slot.temp_max.unwrap_or(0.0)),
            }
        })
        .collect()
}

fn utc_day(timestamp: i64) -> NaiveDate {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .date_naive()
}

/// Min/max temperature and icon frequency across one calendar day's slots.
#[derive(Debug)]
struct DayAggregate {
    first_timestamp: i64,
    temp_min: f64,
    temp_max: f64,
    icons: IconTally,
}

impl DayAggregate {
    fn new(first_timestamp: i64) -> Self {
        Self {
            first_timestamp,
            temp_min: f64::INFINITY,
            temp_max: f64::NEG_INFINITY,
            icons: IconTally::default(),
        }
    }

    fn add(&mut self, slot: &StandardSlot) {
        self.temp_min = self.temp_min.min(slot.temperature);
        self.temp_max = self.temp_max.max(slot.temperature);
        self.icons.add(&slot.icon_code);
    }

    fn into_slot(self) -> ForecastSlot {
        ForecastSlot {
            timestamp: self.first_timestamp,
            temperature: self.temp_max,
            icon_code: self.icons.winner(),
            precipitation_pct: None,
            is_daily: true,
            temp_min: Some(self.temp_min),
            temp_max: Some(self.temp_max),
        }
    }
}

/// Frequency count over icon codes in first-insertion order. A plain Vec
/// rather than a hash map keeps the tie-break deterministic: scanning in
/// insertion order with a strict comparison means the first code to reach
/// the winning count takes the tie.
#[derive(Debug, Default)]
struct IconTally(Vec<(String, u32)>);

impl IconTally {
    fn add(&mut self, icon: &str) {
        match self.0.iter_mut().find(|(code, _)| code == icon) {
            Some((_, count)) => *count += 1,
            None => self.0.push((icon.to_string(), 1)),
        }
    }

    fn winner(self) -> Option<String> {
        let mut best: Option<(String, u32)> = None;
        for (code, count) in self.0 {
            match &best {
                Some((_, best_count)) if *best_count >= count => {}
                _ => best = Some((code, count)),
            }
        }
        best.map(|(code, _)| code)
    }
}
