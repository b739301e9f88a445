//! Console command bindings.
//!
//! Centralizes the single-letter commands accepted on stdin while running.

use std::path::PathBuf;

pub const HELP: &str = "\
commands:
  m          capture the default microphone
  f [PATH]   play a WAV file (no path replays the last one)
  p          pause file playback
  r          resume file playback
  s          stop
  i          show status and current levels
  h          show this help
  q          quit";

/// Actions that can be triggered from the console
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // App-level
    Quit,
    ShowHelp,
    ShowStatus,

    // Capture lifecycle
    StartMicrophone,
    StartFile(Option<PathBuf>),
    Pause,
    Resume,
    Stop,
}

/// Parse one input line into an action.
///
/// Blank lines and unknown commands return `None`.
pub fn parse_command(line: &str) -> Option<Action> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "q" | "quit" => Some(Action::Quit),
        "h" | "help" | "?" => Some(Action::ShowHelp),
        "i" | "status" => Some(Action::ShowStatus),
        "m" | "mic" => Some(Action::StartMicrophone),
        "f" | "file" if rest.is_empty() => Some(Action::StartFile(None)),
        "f" | "file" => Some(Action::StartFile(Some(PathBuf::from(rest)))),
        "p" | "pause" => Some(Action::Pause),
        "r" | "resume" => Some(Action::Resume),
        "s" | "stop" => Some(Action::Stop),
        _ => None,
    }
}
