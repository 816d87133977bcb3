//! Plain-text rendering of the dashboard.
//!
//! Every function here is a pure function of its arguments.

use chrono::{DateTime, Local};
use dashboard_core::{SessionState, WeatherRecord};
use std::{fmt::Write, time::Duration};

const RULE: &str = "------------------------------------------------------------";

pub const LOADING_MESSAGE: &str = "Fetching weather data...";

pub fn header() -> String {
    format!(
        "Weather Dashboard\n\
         Get real-time weather information for any city worldwide\n\
         {RULE}\n"
    )
}

pub fn footer() -> String {
    format!("{RULE}\nPowered by OpenWeatherMap API (https://openweathermap.org/)\n")
}

pub fn welcome() -> String {
    "Welcome to Weather Dashboard\n\
     Search for a city to see current weather conditions\n"
        .to_string()
}

pub fn loading(message: &str) -> String {
    format!("{message}\nPlease wait a moment\n")
}

/// Error banner; empty when there is nothing to show.
pub fn error_banner(message: Option<&str>) -> String {
    match message {
        Some(msg) if !msg.is_empty() => format!("[!] {msg}  (:d to dismiss)\n"),
        _ => String::new(),
    }
}

pub fn weather_card(record: &WeatherRecord) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}, {}", record.city, record.country);
    let _ = writeln!(out, "{}", capitalize(&record.description));
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}°   Feels like {}°C", record.temperature, record.feels_like);
    let _ = writeln!(out, "  {} weather icon: {}", record.category, record.icon_url());
    let _ = writeln!(out);
    let _ = writeln!(out, "  Humidity     {}%", record.humidity);
    let _ = writeln!(out, "  Wind Speed   {} m/s", record.wind_speed);
    out
}

pub fn controls(auto_refresh: bool) -> String {
    let state = if auto_refresh { "ON" } else { "OFF" };
    format!("[:r] Refresh   [:a] Auto-refresh: {state}\n")
}

/// `refresh_every` is `None` when auto-refresh is off.
pub fn last_updated(at: DateTime<Local>, refresh_every: Option<Duration>) -> String {
    let mut line = format!("Last updated: {}", at.format("%H:%M:%S"));
    if let Some(every) = refresh_every {
        let _ = write!(line, " • Auto-refreshes every {}", human_interval(every));
    }
    line.push('\n');
    line
}

pub fn help() -> String {
    "Type a city name and press Enter to search.\n\
     :r  refresh    :a  toggle auto-refresh    :d  dismiss error\n\
     :h  help       :q  quit\n"
        .to_string()
}

/// Compose the whole screen from session state.
pub fn dashboard(state: &SessionState, refresh_every: Duration) -> String {
    let mut sections = vec![header()];

    sections.push(error_banner(state.error.as_deref()));

    if state.loading {
        sections.push(loading(LOADING_MESSAGE));
    } else {
        match &state.record {
            Some(record) => {
                sections.push(controls(state.auto_refresh));
                sections.push(weather_card(record));
                if let Some(at) = state.last_updated {
                    let every = state.auto_refresh.then_some(refresh_every);
                    sections.push(last_updated(at, every));
                }
            }
            None => sections.push(welcome()),
        }
    }

    sections.push(footer());
    sections.retain(|s| !s.is_empty());
    sections.join("\n")
}

fn human_interval(every: Duration) -> String {
    let secs = every.as_secs();
    match (secs / 60, secs % 60) {
        (1, 0) => "minute".to_string(),
        (mins, 0) if mins > 0 => format!("{mins} minutes"),
        _ => format!("{secs} seconds"),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
