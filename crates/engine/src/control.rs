//! Line-oriented control channel on stdin.

use std::io::BufRead;
use std::thread;

use tokio::sync::mpsc;

use market_core::Period;
use session::{Command, DisplayMode};

#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Session(Command),
    Status,
    Quit,
}

pub const HELP: &str = "commands: period <id>, refresh, height <px>, width <px>, mode <live|history>, status, quit";

pub fn parse(line: &str) -> Result<Control, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(HELP.to_string());
    };
    let arg = words.next();

    let cmd = match (verb, arg) {
        ("period", Some(id)) => {
            let period: Period = id.parse().map_err(|e| format!("{e}"))?;
            Command::ChangePeriod(period)
        }
        ("refresh", None) => Command::RefreshPeriod,
        ("height", Some(px)) => Command::SetHeight(pixels(px)?),
        ("width", Some(px)) => Command::ContainerResized(pixels(px)?),
        ("mode", Some("live")) => Command::SetMode(DisplayMode::LiveTailing),
        ("mode", Some("history")) => Command::SetMode(DisplayMode::HistoricalBrowsing),
        ("status", None) => return Ok(Control::Status),
        ("quit" | "exit", None) => return Ok(Control::Quit),
        _ => return Err(format!("can't parse '{}'; {HELP}", line.trim())),
    };
    Ok(Control::Session(cmd))
}

fn pixels(raw: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(px) if px > 0 => Ok(px),
        _ => Err(format!("bad size: {raw}")),
    }
}

/// Reads stdin on a plain thread so a pending read never holds the runtime
/// open on exit. The channel closes at EOF.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}
