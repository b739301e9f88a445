//! Stdin reader feeding actions to the tick loop.

use crossbeam_channel::{unbounded, Receiver};
use std::io::BufRead;
use std::thread;
use tracing::{debug, warn};

use super::bindings::{parse_command, Action, HELP};

/// Read stdin lines on a background thread.
///
/// The channel disconnects when stdin closes; the loop keeps ticking.
pub fn spawn_reader() -> Receiver<Action> {
    let (tx, rx) = unbounded();

    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("stdin read failed: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Some(action) => {
                    if tx.send(action).is_err() {
                        break;
                    }
                }
                None => println!("unknown command {:?}\n{}", line.trim(), HELP),
            }
        }
        debug!("stdin closed");
    });

    rx
}
