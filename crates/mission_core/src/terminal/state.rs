use std::collections::VecDeque;

use crate::vfs::HOME_PATH;

use super::result::StatePatch;

pub const MAX_HISTORY_LINES: usize = 64;
pub const MAX_TRANSCRIPT_LINES: usize = 256;
pub const PASSWORD_PROMPT: &str = "password: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterState {
    pub is_open: bool,
    pub transcript: VecDeque<String>,
    pub awaiting_password: bool,
    pub is_admin: bool,
    pub wrong_password_count: u32,
    pub alert_active: bool,
    pub puzzle_stage: u32,
    pub working_directory: String,
    history: VecDeque<String>,
}

impl Default for InterpreterState {
    fn default() -> Self {
        Self {
            is_open: true,
            transcript: VecDeque::new(),
            awaiting_password: false,
            is_admin: false,
            wrong_password_count: 0,
            alert_active: false,
            puzzle_stage: 0,
            working_directory: HOME_PATH.to_string(),
            history: VecDeque::new(),
        }
    }
}

impl InterpreterState {
    /// `guest@mission:/home/guest$ `, `root@mission:/# `, or the password prompt.
    pub fn prompt(&self) -> String {
        if self.awaiting_password {
            return PASSWORD_PROMPT.to_string();
        }
        if self.is_admin {
            format!("root@mission:{}# ", self.working_directory)
        } else {
            format!("guest@mission:{}$ ", self.working_directory)
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub(crate) fn apply_patch(&mut self, patch: StatePatch) {
        if patch.clear_transcript {
            self.transcript.clear();
        }
        if let Some(is_open) = patch.is_open {
            self.is_open = is_open;
        }
        if let Some(awaiting_password) = patch.awaiting_password {
            self.awaiting_password = awaiting_password;
        }
        if let Some(is_admin) = patch.is_admin {
            self.is_admin = is_admin;
        }
        if let Some(count) = patch.wrong_password_count {
            self.wrong_password_count = count;
        }
        if let Some(alert_active) = patch.alert_active {
            self.alert_active = alert_active;
        }
        if let Some(stage) = patch.puzzle_stage {
            self.puzzle_stage = stage;
        }
        if let Some(directory) = patch.working_directory {
            self.working_directory = directory;
        }
    }

    pub(crate) fn push_transcript(&mut self, line: String) {
        push_capped(&mut self.transcript, line, MAX_TRANSCRIPT_LINES);
    }

    pub(crate) fn record_history(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        push_capped(&mut self.history, line.to_string(), MAX_HISTORY_LINES);
    }
}

/// Appends `line`, evicting from the front until at most `cap` entries remain.
fn push_capped(buffer: &mut VecDeque<String>, line: String, cap: usize) {
    buffer.push_back(line);
    let excess = buffer.len().saturating_sub(cap);
    buffer.drain(..excess);
}
