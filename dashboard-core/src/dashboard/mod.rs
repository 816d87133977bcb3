//! Session state and the controller that drives it.
//!
//! `state` holds the pure reducer, `timer` the auto-refresh ticker, and
//! `controller` wires both to a [`WeatherProvider`](crate::WeatherProvider).

pub mod controller;
pub mod state;
pub mod timer;

pub use controller::Controller;
pub use state::{Action, Effect, SessionState, update};
pub use timer::RefreshTimer;
