use std::{sync::Arc, time::Duration};

use chrono::Local;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::{Config, WeatherProvider};

use super::{
    state::{Action, Effect, SessionState, update},
    timer::RefreshTimer,
};

/// Owns the session state and runs the reducer's effects.
///
/// Fetches are spawned onto the runtime and report back through the event
/// channel, so [`Controller::next_event`] must be polled for state to advance.
/// Nothing guards against overlapping fetches: whichever completes last wins.
#[derive(Debug)]
pub struct Controller {
    provider: Arc<dyn WeatherProvider>,
    state: SessionState,
    timer: RefreshTimer,
    refresh_interval: Duration,
    events_tx: UnboundedSender<Action>,
    events_rx: UnboundedReceiver<Action>,
}

impl Controller {
    pub fn new(provider: Arc<dyn WeatherProvider>, refresh_interval: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            provider,
            state: SessionState::default(),
            timer: RefreshTimer::new(),
            refresh_interval,
            events_tx,
            events_rx,
        }
    }

    pub fn from_config(provider: Arc<dyn WeatherProvider>, config: &Config) -> Self {
        let mut controller = Self::new(provider, config.refresh_interval());
        controller.state.auto_refresh = config.auto_refresh;
        controller
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    /// Feed one action through the reducer and run whatever it asks for.
    ///
    /// Ticks queued by a ticker that has since been cancelled are dropped here.
    pub fn dispatch(&mut self, action: Action) {
        if let Action::TimerTick { generation } = action {
            if !self.timer.is_current(generation) {
                debug!(generation, "dropping stale refresh tick");
                return;
            }
        }

        debug!(?action, "dispatch");
        for effect in update(&mut self.state, action) {
            self.run(effect);
        }
    }

    /// Wait for the next fetch completion or timer tick.
    pub async fn next_event(&mut self) -> Option<Action> {
        self.events_rx.recv().await
    }

    /// Wait for the next event and dispatch it.
    pub async fn step(&mut self) -> bool {
        match self.next_event().await {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    pub fn shutdown(&mut self) {
        self.timer.disarm();
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::Fetch { city, silent } => self.spawn_fetch(city, silent),
            Effect::ArmTimer { city } => {
                info!(city, interval = ?self.refresh_interval, "auto-refresh enabled");
                self.timer.arm(self.refresh_interval, self.events_tx.clone());
            }
            Effect::DisarmTimer => self.timer.disarm(),
        }
    }

    fn spawn_fetch(&self, city: String, silent: bool) {
        let provider = Arc::clone(&self.provider);
        let events = self.events_tx.clone();

        tokio::spawn(async move {
            let result = provider.fetch(&city).await;
            match &result {
                Ok(_) => debug!(city, silent, "fetch succeeded"),
                Err(err) if err.is_user_error() => {
                    debug!(city, silent, error = %err, "fetch rejected")
                }
                Err(err) => warn!(city, silent, error = ?err, "fetch failed"),
            }

            let done = Action::FetchCompleted { city, silent, result, at: Local::now() };
            // The controller may already be gone; nothing left to update then.
            let _ = events.send(done);
        });
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FetchError, WeatherRecord};
    use async_trait::async_trait;
    use std::{collections::VecDeque, sync::Mutex};
    use tokio::time::Instant;

    const INTERVAL: Duration = Duration::from_secs(300);

    /// Replays canned results in order and records every requested city.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        results: Mutex<VecDeque<Result<WeatherRecord, FetchError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(results: Vec<Result<WeatherRecord, FetchError>>) -> Arc<Self> {
            Arc::new(Self { results: Mutex::new(results.into()), calls: Mutex::default() })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn fetch(&self, city: &str) -> Result<WeatherRecord, FetchError> {
            self.calls.lock().unwrap().push(city.to_string());
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::unknown("script exhausted")))
        }
    }

    fn record(city: &str, temperature: i32) -> WeatherRecord {
        WeatherRecord {
            city: city.into(),
            country: "GB".into(),
            temperature,
            feels_like: temperature - 1,
            humidity: 70,
            wind_speed: 3.5,
            description: "light rain".into(),
            icon: "10d".into(),
            category: "Rain".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn search_round_trip_updates_state() {
        let provider = ScriptedProvider::new(vec![Ok(record("London", 12))]);
        let mut controller = Controller::new(provider.clone(), INTERVAL);

        controller.dispatch(Action::search("London"));
        assert!(controller.state().loading);

        assert!(controller.step().await);

        let state = controller.state();
        assert!(!state.loading);
        assert_eq!(state.record.as_ref().unwrap().city, "London");
        assert_eq!(state.last_city, "London");
        assert!(controller.timer_armed());
        assert_eq!(provider.calls(), vec!["London"]);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_triggers_silent_refresh_that_keeps_record_on_failure() {
        let provider = ScriptedProvider::new(vec![
            Ok(record("London", 12)),
            Err(FetchError::Network("unreachable".into())),
        ]);
        let mut controller = Controller::new(provider.clone(), INTERVAL);

        controller.dispatch(Action::search("London"));
        controller.step().await;
        let armed_at = Instant::now();

        // Timer tick.
        let tick = controller.next_event().await.unwrap();
        assert!(matches!(tick, Action::TimerTick { .. }));
        assert!(armed_at.elapsed() >= INTERVAL);
        controller.dispatch(tick);
        assert!(!controller.state().loading);

        // Silent fetch completion.
        controller.step().await;

        let state = controller.state();
        assert_eq!(state.record, Some(record("London", 12)));
        assert_eq!(
            state.error.as_deref(),
            Some("Network error. Please check your internet connection.")
        );
        assert!(!state.loading);
        assert_eq!(provider.calls(), vec!["London", "London"]);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_refresh_replaces_record_on_success() {
        let provider =
            ScriptedProvider::new(vec![Ok(record("London", 12)), Ok(record("London", 9))]);
        let mut controller = Controller::new(provider, INTERVAL);

        controller.dispatch(Action::search("London"));
        controller.step().await;
        controller.step().await; // tick
        controller.step().await; // silent completion

        assert_eq!(controller.state().record.as_ref().unwrap().temperature, 9);
        assert!(controller.timer_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn tick_from_cancelled_timer_is_dropped() {
        let provider = ScriptedProvider::new(vec![
            Ok(record("London", 12)),
            Ok(record("Paris", 18)),
            Ok(record("Paris", 17)),
        ]);
        let mut controller = Controller::new(provider.clone(), INTERVAL);

        controller.dispatch(Action::search("London"));
        controller.step().await;
        let london_timer = controller.timer.generation();

        controller.dispatch(Action::search("Paris"));
        controller.step().await;
        let paris_timer = controller.timer.generation();
        assert_ne!(london_timer, paris_timer);

        // A tick the London ticker queued before it was cancelled.
        controller.dispatch(Action::TimerTick { generation: london_timer });
        tokio::task::yield_now().await;
        assert_eq!(provider.calls(), vec!["London", "Paris"]);

        controller.dispatch(Action::TimerTick { generation: paris_timer });
        tokio::task::yield_now().await;
        assert_eq!(provider.calls(), vec!["London", "Paris", "Paris"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_search_leaves_timer_disarmed() {
        let provider = ScriptedProvider::new(vec![Err(FetchError::NotFound)]);
        let mut controller = Controller::new(provider, INTERVAL);

        controller.dispatch(Action::search("Atlantis"));
        controller.step().await;

        let state = controller.state();
        assert!(state.record.is_none());
        assert!(!state.loading);
        assert_eq!(
            state.error.as_deref(),
            Some("City not found. Please check the spelling and try again.")
        );
        assert!(!controller.timer_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn toggling_auto_refresh_disarms_and_rearms() {
        let provider = ScriptedProvider::new(vec![Ok(record("London", 12))]);
        let mut controller = Controller::new(provider.clone(), INTERVAL);

        controller.dispatch(Action::search("London"));
        controller.step().await;
        assert!(controller.timer_armed());

        controller.dispatch(Action::ToggleAutoRefresh);
        assert!(!controller.timer_armed());
        assert!(!controller.state().auto_refresh);

        controller.dispatch(Action::ToggleAutoRefresh);
        assert!(controller.timer_armed());
        assert!(controller.state().auto_refresh);

        assert_eq!(provider.calls(), vec!["London"]);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_before_search_does_nothing() {
        let provider = ScriptedProvider::new(Vec::new());
        let mut controller = Controller::new(provider.clone(), INTERVAL);
        let before = controller.state().clone();

        controller.dispatch(Action::Refresh);

        assert_eq!(controller.state(), &before);
        assert!(provider.calls().is_empty());
        assert!(!controller.timer_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn from_config_respects_auto_refresh_setting() {
        let provider = ScriptedProvider::new(vec![Ok(record("London", 12))]);
        let config = Config { auto_refresh: false, refresh_interval_secs: 60, ..Config::default() };
        let mut controller = Controller::from_config(provider, &config);

        assert_eq!(controller.refresh_interval(), Duration::from_secs(60));
        controller.dispatch(Action::search("London"));
        controller.step().await;

        assert!(!controller.state().auto_refresh);
        assert!(!controller.timer_armed());
    }
}
