use dashboard_core::Action;

/// Longest city name accepted from the prompt.
pub const MAX_CITY_LEN: usize = 85;

/// One line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Refresh,
    ToggleAutoRefresh,
    DismissError,
    Help,
    Quit,
}

impl Command {
    /// The controller action for this command, if it has one.
    pub fn into_action(self) -> Option<Action> {
        match self {
            Command::Search(city) => Some(Action::search(city)),
            Command::Refresh => Some(Action::Refresh),
            Command::ToggleAutoRefresh => Some(Action::ToggleAutoRefresh),
            Command::DismissError => Some(Action::DismissError),
            Command::Help | Command::Quit => None,
        }
    }
}

/// Parse a prompt line. Blank input yields `None` and never reaches the controller.
pub fn parse(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let command = match trimmed {
        ":r" | ":refresh" => Command::Refresh,
        ":a" | ":auto" => Command::ToggleAutoRefresh,
        ":d" | ":dismiss" => Command::DismissError,
        ":h" | ":help" | "?" => Command::Help,
        ":q" | ":quit" | "quit" | "exit" => Command::Quit,
        city => Command::Search(cap_city(city)),
    };

    Some(command)
}

fn cap_city(city: &str) -> String {
    let capped: String = city.chars().take(MAX_CITY_LEN).collect();
    capped.trim_end().to_string()
}
