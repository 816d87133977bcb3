use thiserror::Error;

/// Everything that can go wrong while fetching current weather.
///
/// `Display` yields the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Please enter a city name")]
    InvalidInput,

    #[error("City not found. Please check the spelling and try again.")]
    NotFound,

    #[error("API key is invalid. Please check your configuration.")]
    Auth,

    #[error("Unable to fetch weather data. Please try again later.")]
    Service { status: u16 },

    /// The request went out but no response came back.
    #[error("Network error. Please check your internet connection.")]
    Network(String),

    #[error("{0}")]
    Unknown(String),
}

impl FetchError {
    pub fn unknown(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            FetchError::Unknown("An unexpected error occurred.".to_string())
        } else {
            FetchError::Unknown(message)
        }
    }

    /// Failures caused by what the user typed rather than by the service,
    /// the network or the configured credentials.
    pub fn is_user_error(&self) -> bool {
        matches!(self, FetchError::InvalidInput | FetchError::NotFound)
    }

    /// Classify a non-2xx HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => FetchError::NotFound,
            401 => FetchError::Auth,
            _ => FetchError::Service { status },
        }
    }
}
