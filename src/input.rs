//! Line-based controls for the terminal host.
//!
//! The terminal stays in cooked mode, so each control is a short line
//! followed by Enter. Lines are read on a background thread and drained by
//! the frame loop.

use crate::config::ActivationMode;
use speedread_core::SessionCommand;
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use tracing::debug;

pub const HELP: &str = "controls: <enter>/p play-pause  f/b skip  ]/[ paragraph  +/- speed  \
g <percent> seek  s source  r resume  q quit\n\
settings: ramp <secs>  pause <secs|off>  rampreset on|off  mode auto|manual";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostInput {
    Session(SessionCommand),
    FasterWpm,
    SlowerWpm,
    RampDuration(f64),
    /// `None` turns the paragraph pause off.
    ParagraphPause(Option<f64>),
    ParagraphRampReset(bool),
    Activation(ActivationMode),
    Help,
}

pub fn parse_input(line: &str) -> Option<HostInput> {
    let normalized = line.trim().to_ascii_lowercase();
    let mut parts = normalized.split_whitespace();
    let head = parts.next().unwrap_or("");

    let input = match head {
        "" | "p" | "space" => HostInput::Session(SessionCommand::TogglePlayPause),
        "f" => HostInput::Session(SessionCommand::SkipForward),
        "b" => HostInput::Session(SessionCommand::SkipBackward),
        "]" => HostInput::Session(SessionCommand::NextParagraph),
        "[" => HostInput::Session(SessionCommand::PreviousParagraph),
        "+" | "=" => HostInput::FasterWpm,
        "-" => HostInput::SlowerWpm,
        "s" => HostInput::Session(SessionCommand::ShowSource),
        "r" => HostInput::Session(SessionCommand::HideSource),
        "q" => HostInput::Session(SessionCommand::Close),
        "?" | "h" => HostInput::Help,
        "g" => {
            let percent: f64 = parts.next()?.trim_end_matches('%').parse().ok()?;
            HostInput::Session(SessionCommand::Seek {
                fraction: percent / 100.0,
            })
        }
        "ramp" => HostInput::RampDuration(parts.next()?.parse().ok()?),
        "pause" => match parts.next()? {
            "off" => HostInput::ParagraphPause(None),
            secs => HostInput::ParagraphPause(Some(secs.parse().ok()?)),
        },
        "rampreset" => HostInput::ParagraphRampReset(parse_switch(parts.next()?)?),
        "mode" => match parts.next()? {
            "auto" => HostInput::Activation(ActivationMode::Auto),
            "manual" => HostInput::Activation(ActivationMode::Manual),
            _ => return None,
        },
        _ => return None,
    };
    Some(input)
}

fn parse_switch(value: &str) -> Option<bool> {
    match value {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Forwards stdin lines over a channel until stdin closes.
pub fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
        debug!("Stdin reader finished");
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_toggles_playback() {
        assert_eq!(
            parse_input(""),
            Some(HostInput::Session(SessionCommand::TogglePlayPause))
        );
        assert_eq!(
            parse_input("  P "),
            Some(HostInput::Session(SessionCommand::TogglePlayPause))
        );
    }

    #[test]
    fn maps_navigation_and_speed_keys() {
        assert_eq!(
            parse_input("]"),
            Some(HostInput::Session(SessionCommand::NextParagraph))
        );
        assert_eq!(
            parse_input("b"),
            Some(HostInput::Session(SessionCommand::SkipBackward))
        );
        assert_eq!(parse_input("+"), Some(HostInput::FasterWpm));
        assert_eq!(parse_input("-"), Some(HostInput::SlowerWpm));
        assert_eq!(
            parse_input("q"),
            Some(HostInput::Session(SessionCommand::Close))
        );
    }

    #[test]
    fn seek_takes_a_percentage() {
        assert_eq!(
            parse_input("g 25%"),
            Some(HostInput::Session(SessionCommand::Seek { fraction: 0.25 }))
        );
        assert_eq!(parse_input("g"), None);
        assert_eq!(parse_input("g half"), None);
    }

    #[test]
    fn parses_settings_controls() {
        assert_eq!(parse_input("ramp 4.5"), Some(HostInput::RampDuration(4.5)));
        assert_eq!(parse_input("pause off"), Some(HostInput::ParagraphPause(None)));
        assert_eq!(
            parse_input("pause 1.25"),
            Some(HostInput::ParagraphPause(Some(1.25)))
        );
        assert_eq!(
            parse_input("RampReset ON"),
            Some(HostInput::ParagraphRampReset(true))
        );
        assert_eq!(
            parse_input("mode auto"),
            Some(HostInput::Activation(ActivationMode::Auto))
        );
        assert_eq!(parse_input("mode sometimes"), None);
        assert_eq!(parse_input("ramp"), None);
    }

    #[test]
    fn unknown_lines_are_ignored() {
        assert_eq!(parse_input("xyzzy"), None);
    }
}
