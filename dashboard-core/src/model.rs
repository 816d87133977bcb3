use serde::{Deserialize, Serialize};

const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

/// Flat display record built from one current-weather response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    pub country: String,
    /// Degrees Celsius, rounded.
    pub temperature: i32,
    /// Degrees Celsius, rounded.
    pub feels_like: i32,
    pub humidity: u8,
    /// Metres per second, as reported.
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
    /// Provider's coarse condition label, e.g. "Clouds".
    pub category: String,
}

impl WeatherRecord {
    pub fn icon_url(&self) -> String {
        icon_url(&self.icon)
    }
}

/// URL of the provider's static image for an icon code.
pub fn icon_url(icon_code: &str) -> String {
    format!("{ICON_URL_BASE}/{icon_code}@2x.png")
}
