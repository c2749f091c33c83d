use std::{
    io::{self, BufRead},
    sync::mpsc::{self, Receiver},
    thread,
};

use log::{debug, warn};
use pacer_core::{config::ReaderConfig, player::Command};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum KeyAction {
    Player(Command),
    /// Drop whichever source is active.
    RemoveActive,
    Quit,
}

/// Reads stdin line by line on a helper thread. The channel disconnects when
/// stdin reaches end of file.
pub(super) fn spawn_stdin_reader(config: ReaderConfig) -> io::Result<Receiver<KeyAction>> {
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name("stdin-keys".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("keys: read failed err={}", err);
                        break;
                    }
                };

                match parse_key_line(&line, &config) {
                    Some(action) => {
                        if tx.send(action).is_err() {
                            break;
                        }
                    }
                    None => debug!("keys: ignored line={:?}", line),
                }
            }
        })?;

    Ok(rx)
}

/// Maps one input line to an action. Empty lines toggle pause so that a bare
/// Enter works like the space bar.
pub(super) fn parse_key_line(line: &str, config: &ReaderConfig) -> Option<KeyAction> {
    let line = line.trim();

    let command = match line {
        "" | "p" | "space" => Command::TogglePause,
        "+" => Command::SpeedUp(config.speed_step),
        "++" => Command::SpeedUp(config.speed_step_big),
        "-" => Command::SpeedDown(config.speed_step),
        "--" => Command::SpeedDown(config.speed_step_big),
        "r" => Command::ResetSpeed,
        "[" => Command::Rewind(config.rewind_step),
        "]" => Command::Skip(config.skip_step),
        "c" => Command::CycleChunkSize,
        "n" => Command::NextSource,
        "b" => Command::PrevSource,
        "a" => Command::ToggleAutoAdvance,
        "s" => Command::Stop,
        "?" | "h" => Command::ShowHelp,
        "x" => return Some(KeyAction::RemoveActive),
        "q" | "quit" => return Some(KeyAction::Quit),
        _ => {
            let number = line.strip_prefix('g')?.trim().parse::<usize>().ok()?;
            Command::SelectSource(number.checked_sub(1)?)
        }
    };

    Some(KeyAction::Player(command))
}
