use std::{
    io::{self, IsTerminal, Write},
    time::Duration,
};

use dashboard_core::{Action, Controller, SessionState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::{
    input::{self, Command},
    view,
};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Drive the dashboard until the user quits, stdin closes or Ctrl-C arrives.
pub async fn run(mut controller: Controller, initial_city: Option<String>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();
    let clear = stdout.is_terminal();
    let mut show_help = false;

    if let Some(Command::Search(city)) = initial_city.as_deref().and_then(input::parse) {
        controller.dispatch(Action::search(city));
    }

    loop {
        redraw(&mut stdout, &controller, clear, show_help)?;
        show_help = false;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                match input::parse(&line) {
                    Some(Command::Quit) => break,
                    Some(Command::Help) => show_help = true,
                    Some(command) => {
                        if let Some(action) = command.into_action() {
                            controller.dispatch(action);
                        }
                    }
                    None => {}
                }
            }
            Some(action) = controller.next_event() => controller.dispatch(action),
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
        }
    }

    controller.shutdown();
    Ok(())
}

/// Assemble one frame: the dashboard, optional help and the prompt.
fn screen(state: &SessionState, refresh_every: Duration, clear: bool, show_help: bool) -> String {
    let mut screen = String::new();
    if clear {
        screen.push_str(CLEAR_SCREEN);
    }
    screen.push_str(&view::dashboard(state, refresh_every));
    if show_help {
        screen.push('\n');
        screen.push_str(&view::help());
    }
    let prompt = if state.loading { "Searching..." } else { "City (:h for help)" };
    screen.push_str(&format!("\n{prompt}> "));
    screen
}

fn redraw(
    out: &mut impl Write,
    controller: &Controller,
    clear: bool,
    show_help: bool,
) -> io::Result<()> {
    let frame = screen(controller.state(), controller.refresh_interval(), clear, show_help);
    out.write_all(frame.as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::{OpenWeatherProvider, WeatherProvider};
    use std::sync::Arc;

    /// Accepts writes but fails every flush, like a closed pipe.
    struct BrokenPipe(Vec<u8>);

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }
    }

    fn controller() -> Controller {
        let provider: Arc<dyn WeatherProvider> = Arc::new(OpenWeatherProvider::new("KEY".into()));
        Controller::new(provider, Duration::from_secs(300))
    }

    #[test]
    fn frame_ends_with_prompt() {
        let frame = screen(&SessionState::default(), Duration::from_secs(300), false, false);

        assert!(frame.contains("Welcome to Weather Dashboard"));
        assert!(frame.ends_with("City (:h for help)> "));
        assert!(!frame.starts_with(CLEAR_SCREEN));
    }

    #[test]
    fn loading_frame_prompts_searching_and_can_clear() {
        let state = SessionState { loading: true, ..SessionState::default() };
        let frame = screen(&state, Duration::from_secs(300), true, true);

        assert!(frame.starts_with(CLEAR_SCREEN));
        assert!(frame.contains(":q  quit"));
        assert!(frame.ends_with("Searching...> "));
    }

    #[tokio::test]
    async fn redraw_writes_frame() {
        let mut out = Vec::new();

        redraw(&mut out, &controller(), false, false).unwrap();

        let written = String::from_utf8(out).unwrap();
        assert!(written.ends_with("City (:h for help)> "));
    }

    #[tokio::test]
    async fn redraw_reports_flush_failure() {
        let mut out = BrokenPipe(Vec::new());

        let err = redraw(&mut out, &controller(), false, false).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(!out.0.is_empty());
    }
}
