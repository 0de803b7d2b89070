use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use tracing::{info, warn};

/// Source of complete operator lines, drained once per frame.
pub(crate) trait LinePump {
    /// Moves every pending line into `out`. Returns false once the source is
    /// exhausted and no more lines will arrive.
    fn drain_pending_lines(&mut self, out: &mut Vec<String>) -> bool;
}

/// Reads stdin on a dedicated thread so the frame loop never blocks on input.
pub(crate) struct StdinLinePump {
    receiver: Receiver<String>,
}

impl StdinLinePump {
    pub(crate) fn spawn() -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || read_lines(io::stdin().lock(), sender))?;
        Ok(Self { receiver })
    }
}

impl LinePump for StdinLinePump {
    fn drain_pending_lines(&mut self, out: &mut Vec<String>) -> bool {
        drain_channel(&self.receiver, out)
    }
}

fn read_lines(reader: impl BufRead, sender: Sender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if sender.send(line).is_err() {
                    return;
                }
            }
            Err(err) => {
                warn!(error = %err, "stdin_read_failed");
                return;
            }
        }
    }
    info!("stdin_closed");
}

fn drain_channel(receiver: &Receiver<String>, out: &mut Vec<String>) -> bool {
    loop {
        match receiver.try_recv() {
            Ok(line) => out.push(line),
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

/// Fixed script of lines, for tests.
#[cfg(test)]
pub(crate) struct ScriptedLines {
    pub(crate) batches: std::collections::VecDeque<Vec<String>>,
}

#[cfg(test)]
impl LinePump for ScriptedLines {
    fn drain_pending_lines(&mut self, out: &mut Vec<String>) -> bool {
        match self.batches.pop_front() {
            Some(batch) => {
                out.extend(batch);
                true
            }
            None => false,
        }
    }
}
