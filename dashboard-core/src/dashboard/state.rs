use chrono::{DateTime, Local};

use crate::{FetchError, WeatherRecord};

/// Everything the dashboard knows for the lifetime of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Empty until the first successful search.
    pub last_city: String,
    pub record: Option<WeatherRecord>,
    pub error: Option<String>,
    pub loading: bool,
    pub auto_refresh: bool,
    pub last_updated: Option<DateTime<Local>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            last_city: String::new(),
            record: None,
            error: None,
            loading: false,
            auto_refresh: true,
            last_updated: None,
        }
    }
}

impl SessionState {
    pub fn with_auto_refresh(auto_refresh: bool) -> Self {
        Self { auto_refresh, ..Self::default() }
    }

    pub fn has_searched(&self) -> bool {
        !self.last_city.is_empty()
    }

    /// Whether the refresh timer should be running.
    pub fn wants_timer(&self) -> bool {
        self.has_searched() && self.auto_refresh
    }
}

/// Inputs to [`update`]: user intents plus completions coming back from effects.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Search { city: String, silent: bool },
    Refresh,
    DismissError,
    ToggleAutoRefresh,
    /// Sent by the refresh timer; `generation` identifies which arming sent it.
    TimerTick { generation: u64 },
    FetchCompleted {
        city: String,
        silent: bool,
        result: Result<WeatherRecord, FetchError>,
        at: DateTime<Local>,
    },
}

impl Action {
    /// A user-initiated search.
    pub fn search(city: impl Into<String>) -> Self {
        Action::Search { city: city.into(), silent: false }
    }
}

/// Work the reducer asks the controller to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch { city: String, silent: bool },
    ArmTimer { city: String },
    DisarmTimer,
}

/// Apply `action` to `state` and return the effects to run.
pub fn update(state: &mut SessionState, action: Action) -> Vec<Effect> {
    match action {
        Action::Search { city, silent } => start_search(state, city, silent),

        Action::Refresh => {
            if !state.has_searched() {
                return Vec::new();
            }
            let city = state.last_city.clone();
            start_search(state, city, false)
        }

        Action::DismissError => {
            state.error = None;
            Vec::new()
        }

        Action::ToggleAutoRefresh => {
            state.auto_refresh = !state.auto_refresh;
            vec![timer_effect(state)]
        }

        Action::TimerTick { .. } => {
            // A tick can race a disarm; only act if the timer is still wanted.
            if !state.wants_timer() {
                return Vec::new();
            }
            vec![Effect::Fetch { city: state.last_city.clone(), silent: true }]
        }

        Action::FetchCompleted { city, silent, result, at } => {
            let mut effects = Vec::new();

            match result {
                Ok(record) => {
                    state.record = Some(record);
                    state.error = None;
                    state.last_updated = Some(at);
                    if state.last_city != city {
                        state.last_city = city;
                        effects.push(timer_effect(state));
                    }
                }
                Err(err) => {
                    state.error = Some(err.to_string());
                    if !silent {
                        state.record = None;
                    }
                }
            }

            if !silent {
                state.loading = false;
            }

            effects
        }
    }
}

fn start_search(state: &mut SessionState, city: String, silent: bool) -> Vec<Effect> {
    if !silent {
        state.loading = true;
        state.error = None;
    }
    vec![Effect::Fetch { city, silent }]
}

fn timer_effect(state: &SessionState) -> Effect {
    if state.wants_timer() {
        Effect::ArmTimer { city: state.last_city.clone() }
    } else {
        Effect::DisarmTimer
    }
}
