//! Backend for the Caiyun (caiyun.com) v2.5 weather API.
//!
//! The response model below mirrors the upstream JSON one-to-one and is a
//! pure decode target: unknown payload fields are dropped and declared
//! fields missing from the payload take their zero value, so upstream can
//! add or omit fields without breaking the decode.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use crate::{
    Config, NormalizedOutput,
    backend::{Backend, FetchError},
    model::{CurrentConditions, HourlyPoint},
    timeseries::TimeSeriesValue,
};

pub const BACKEND_NAME: &str = "caiyun.com";

const DEFAULT_BASE_URL: &str = "https://api.caiyunapp.com";

// Hangzhou, the upstream project's hometown default.
const DEFAULT_LATITUDE: f64 = 30.274085;
const DEFAULT_LONGITUDE: f64 = 120.15507;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LifeIndex {
    #[serde(default)]
    pub index: f32,
    #[serde(default)]
    pub desc: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LifeIndices {
    #[serde(default)]
    pub ultraviolet: LifeIndex,
    #[serde(default)]
    pub comfort: LifeIndex,
}

/// Air-quality index broken out by national standard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Aqi {
    /// Chinese national standard (GB 3095-2012).
    #[serde(default)]
    pub chn: i32,
    /// US EPA standard.
    #[serde(default)]
    pub usa: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AqiDescription {
    #[serde(default)]
    pub chn: String,
    #[serde(default)]
    pub usa: String,
}

/// Pollutant concentrations in µg/m³ (CO in mg/m³).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirQuality {
    #[serde(default)]
    pub pm25: i32,
    #[serde(default)]
    pub pm10: i32,
    #[serde(default)]
    pub o3: i32,
    #[serde(default)]
    pub so2: i32,
    #[serde(default)]
    pub no2: i32,
    #[serde(default)]
    pub co: f32,
    #[serde(default)]
    pub aqi: Aqi,
    #[serde(default, rename = "description")]
    pub desc: AqiDescription,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Wind {
    /// Kilometres per hour.
    #[serde(default)]
    pub speed: f32,
    /// Compass degrees, 0 = north.
    #[serde(default)]
    pub direction: f32,
}

/// Instantaneous observation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Realtime {
    #[serde(default)]
    pub status: String,
    /// Degrees Celsius.
    #[serde(default)]
    pub temperature: f32,
    /// Relative humidity as a 0..1 fraction.
    #[serde(default)]
    pub humidity: f32,
    /// Cloud cover as a 0..1 fraction.
    #[serde(default)]
    pub cloudrate: f32,
    /// Sky condition code, e.g. "CLEAR_DAY".
    #[serde(default)]
    pub skycon: String,
    /// Kilometres.
    #[serde(default)]
    pub visibility: f32,
    /// Downward shortwave radiation flux, W/m².
    #[serde(default)]
    pub dswrf: f32,
    #[serde(default)]
    pub wind: Wind,
    /// Surface pressure in pascals.
    #[serde(default)]
    pub pressure: f32,
    /// Degrees Celsius.
    #[serde(default)]
    pub apparent_temperature: f32,
    #[serde(default, rename = "aqi_quality")]
    pub air_quality: AirQuality,
    #[serde(default)]
    pub life_index: LifeIndices,
}

/// Hourly forecast: parallel series on the same hourly cadence,
/// chronological ascending, bounded by the upstream forecast horizon.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hourly {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: String,
    /// Degrees Celsius.
    #[serde(default)]
    pub temperature: Vec<TimeSeriesValue<f32>>,
    /// Relative humidity as a 0..1 fraction.
    #[serde(default)]
    pub humidity: Vec<TimeSeriesValue<f32>>,
    /// Surface pressure in pascals.
    #[serde(default)]
    pub pressure: Vec<TimeSeriesValue<f32>>,
    /// Kilometres.
    #[serde(default)]
    pub visibility: Vec<TimeSeriesValue<f32>>,
    /// Downward shortwave radiation flux, W/m².
    #[serde(default)]
    pub dswrf: Vec<TimeSeriesValue<f32>>,
    /// Sky condition codes.
    #[serde(default)]
    pub skycon: Vec<TimeSeriesValue<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherResult {
    #[serde(default)]
    pub realtime: Realtime,
    #[serde(default)]
    pub hourly: Hourly,
}

/// Top-level envelope of a v2.5 weather response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub api_status: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub unit: String,
    /// Timezone offset from UTC in seconds.
    #[serde(default)]
    pub tzshift: i32,
    #[serde(default)]
    pub timezone: String,
    /// Unix seconds.
    #[serde(default)]
    pub server_time: i64,
    /// `[latitude, longitude]` pair echoed back by the API.
    #[serde(default)]
    pub location: [f32; 2],
    #[serde(default)]
    pub result: WeatherResult,
}

#[derive(Debug, Clone)]
struct Credentials {
    token: String,
    latitude: f64,
    longitude: f64,
}

/// Backend for caiyun.com. Unconfigured until `setup` binds the token and
/// coordinates; configuration is read-only afterwards, so concurrent
/// `fetch` calls against one instance are safe.
#[derive(Debug)]
pub struct CaiyunBackend {
    base_url: String,
    http: Client,
    credentials: Option<Credentials>,
}

impl CaiyunBackend {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different host (used by the HTTP tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: Client::new(), credentials: None }
    }

    fn request_url(&self, credentials: &Credentials) -> String {
        format!(
            "{}/v2.5/{}/{},{}/weather.json?alert=true",
            self.base_url, credentials.token, credentials.longitude, credentials.latitude
        )
    }

    async fn fetch_weather(&self) -> Result<WeatherResponse, FetchError> {
        let credentials = self.credentials.as_ref().ok_or(FetchError::NotConfigured)?;
        let url = self.request_url(credentials);
        debug!(%url, "requesting caiyun weather");

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport { url: url.clone(), source })?;

        let code = res.status().as_u16();
        if code != 200 {
            return Err(FetchError::HttpStatus { url, code });
        }

        let body = res
            .text()
            .await
            .map_err(|source| FetchError::BodyRead { url: url.clone(), source })?;

        let data = serde_json::from_str(&body)
            .map_err(|source| FetchError::Decode { url, body, source })?;

        Ok(data)
    }
}

impl Default for CaiyunBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(data: &WeatherResponse) -> NormalizedOutput {
    let realtime = &data.result.realtime;

    let current = CurrentConditions {
        temperature_c: realtime.temperature,
        apparent_temperature_c: realtime.apparent_temperature,
        humidity: realtime.humidity,
        condition: realtime.skycon.clone(),
        wind_speed_kph: realtime.wind.speed,
        wind_direction_deg: realtime.wind.direction,
        pressure_pa: realtime.pressure,
        visibility_km: realtime.visibility,
    };

    let hourly_temperature = data
        .result
        .hourly
        .temperature
        .iter()
        .map(|entry| HourlyPoint { datetime: entry.datetime, temperature_c: entry.value })
        .collect();

    NormalizedOutput {
        provider: BACKEND_NAME.to_string(),
        location: Some(data.location),
        current: Some(current),
        hourly_temperature,
    }
}

#[async_trait]
impl Backend for CaiyunBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn setup(&mut self, config: &Config) -> anyhow::Result<()> {
        let cfg = config.backend_config(BACKEND_NAME).ok_or_else(|| {
            anyhow!(
                "no configuration for backend '{BACKEND_NAME}'.\n\
                 Hint: run `skywatch configure {BACKEND_NAME}` and enter your API token."
            )
        })?;

        self.credentials = Some(Credentials {
            token: cfg.api_token.clone(),
            latitude: cfg.latitude.unwrap_or(DEFAULT_LATITUDE),
            longitude: cfg.longitude.unwrap_or(DEFAULT_LONGITUDE),
        });

        Ok(())
    }

    async fn fetch(&self, _location: &str, _numdays: u32) -> Result<NormalizedOutput, FetchError> {
        match self.fetch_weather().await {
            Ok(data) => Ok(normalize(&data)),
            Err(err) => {
                error!(backend = BACKEND_NAME, error = %err, "caiyun fetch failed");
                Err(err)
            }
        }
    }
}
