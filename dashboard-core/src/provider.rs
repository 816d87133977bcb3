use crate::{Config, FetchError, WeatherRecord, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// A source of current weather, looked up by city name.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Issue one lookup for `city`. Implementations must reject blank names with
    /// [`FetchError::InvalidInput`] before touching the network.
    async fn fetch(&self, city: &str) -> Result<WeatherRecord, FetchError>;
}

/// Reject empty or whitespace-only city names.
pub fn validate_city(city: &str) -> Result<(), FetchError> {
    if city.trim().is_empty() {
        return Err(FetchError::InvalidInput);
    }
    Ok(())
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::with_base_url(api_key.to_owned(), config.base_url());

    Ok(Box::new(provider))
}
