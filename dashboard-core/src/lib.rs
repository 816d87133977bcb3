//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - The OpenWeatherMap client and its error taxonomy
//! - The display record shared with front ends
//! - Session state, the reducer that updates it and the auto-refresh controller
//! - Configuration & credentials handling
//!
//! It is used by `dashboard-cli`, but the controller has no terminal
//! dependencies and can be driven by any front end.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod provider;

pub use config::Config;
pub use dashboard::{Action, Controller, Effect, SessionState};
pub use error::FetchError;
pub use model::{WeatherRecord, icon_url};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
