use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Provider-agnostic result consumed by the aggregation layer.
///
/// `NormalizedOutput::default()` is the documented zero value for callers
/// that degrade instead of failing (see `Backend::fetch_or_empty`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOutput {
    /// Registry name of the backend that produced this data.
    pub provider: String,
    /// `[latitude, longitude]` pair as reported by the provider.
    pub location: Option<[f32; 2]>,
    pub current: Option<CurrentConditions>,
    pub hourly_temperature: Vec<HourlyPoint>,
}

/// Instantaneous observation snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Degrees Celsius.
    pub temperature_c: f32,
    /// Degrees Celsius.
    pub apparent_temperature_c: f32,
    /// Relative humidity as a 0..1 fraction.
    pub humidity: f32,
    /// Provider condition code, e.g. "CLEAR_DAY".
    pub condition: String,
    /// Kilometres per hour.
    pub wind_speed_kph: f32,
    /// Compass degrees, 0 = north.
    pub wind_direction_deg: f32,
    /// Surface pressure in pascals.
    pub pressure_pa: f32,
    /// Kilometres.
    pub visibility_km: f32,
}

/// One point of an hourly forecast series, chronological ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub datetime: DateTime<FixedOffset>,
    /// Degrees Celsius.
    pub temperature_c: f32,
}
