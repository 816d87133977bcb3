use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{FetchError, WeatherRecord};

use super::{WeatherProvider, validate_city};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherRecord, FetchError> {
        let url = format!("{}/weather", self.base_url);

        debug!(city, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            FetchError::unknown(format!("Failed to read OpenWeather response body: {e}"))
        })?;

        if !status.is_success() {
            let err = FetchError::from_status(status.as_u16());
            if err.is_user_error() {
                debug!(city, status = status.as_u16(), "OpenWeather rejected the lookup");
            } else {
                warn!(
                    city,
                    status = status.as_u16(),
                    body = %truncate_body(&body),
                    "OpenWeather request failed"
                );
            }
            return Err(err);
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            FetchError::unknown(format!("Failed to parse OpenWeather current JSON: {e}"))
        })?;

        parsed.into_record()
    }
}

fn classify_send_error(err: reqwest::Error) -> FetchError {
    if err.is_builder() {
        FetchError::unknown(err.to_string())
    } else {
        // Anything past building means the request left without a response.
        FetchError::Network(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl OwCurrentResponse {
    fn into_record(self) -> Result<WeatherRecord, FetchError> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::unknown("OpenWeather response contained no conditions"))?;

        Ok(WeatherRecord {
            city: self.name,
            country: self.sys.country,
            temperature: self.main.temp.round() as i32,
            feels_like: self.main.feels_like.round() as i32,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            description: condition.description,
            icon: condition.icon,
            category: condition.main,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, city: &str) -> Result<WeatherRecord, FetchError> {
        validate_city(city)?;
        self.fetch_current(city).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
