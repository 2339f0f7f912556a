use std::time::Duration;

use engine_logging::engine_info;
use schedule_engine::{Dashboard, EventHandle};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::terminal::TerminalSurface;

const HELP: &str = "commands: scroll <container> | refresh | period <ms> | status | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scroll(String),
    Refresh,
    /// Zero, or anything that is not a number, disables the timer.
    Period(Duration),
    Status,
    Quit,
    Help,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let command = match words.next()? {
        "scroll" => Command::Scroll(words.next()?.to_string()),
        "refresh" => Command::Refresh,
        "period" => {
            let millis = words
                .next()
                .and_then(|raw| raw.parse::<u64>().ok())
                .unwrap_or(0);
            Command::Period(Duration::from_millis(millis))
        }
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        "help" | "?" => Command::Help,
        _ => return None,
    };
    Some(command)
}

/// Reads operator commands from stdin until `quit` or end of input, then asks
/// the event loop to shut down.
pub async fn run_console(
    dashboard: &Dashboard,
    surface: &TerminalSurface,
    events: EventHandle,
) -> std::io::Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let result = loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(err) => break Err(err),
        };
        match parse_command(&line) {
            Some(Command::Scroll(container_id)) => {
                if surface.scroll_to_bottom(&container_id) {
                    events.scroll_near_bottom(container_id);
                } else {
                    println!("unknown container {container_id}");
                }
            }
            Some(Command::Refresh) => events.refresh(),
            Some(Command::Period(period)) => events.set_refresh_period(period),
            Some(Command::Status) => {
                for window in dashboard.windows() {
                    let view = window.view();
                    println!(
                        "{}: rendered {}/{} cursor {} exhausted {} fetching {}",
                        view.container_id,
                        view.rendered,
                        view.buffered,
                        view.cursor,
                        view.exhausted,
                        view.fetching
                    );
                }
            }
            Some(Command::Quit) => break Ok(()),
            Some(Command::Help) | None => println!("{HELP}"),
        }
    };
    engine_info!("console closed");
    events.shutdown();
    result
}
