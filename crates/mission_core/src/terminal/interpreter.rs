use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::config::MissionConfig;
use crate::geofence::GeofenceRegistry;
use crate::roster::Roster;
use crate::vfs::Vfs;

use super::commands::ALERT_DURATION_MS;
use super::registry::{CommandContext, CommandRegistry};
use super::result::{CommandResult, StatePatch};
use super::state::InterpreterState;

pub const OPERATOR_PASSWORD: &str = "skywatch";
pub const PASSWORD_LOCKOUT_THRESHOLD: u32 = 3;
const PUZZLE_TOKENS: [&str; 2] = ["ground", "control"];

type ClockFn = dyn Fn() -> DateTime<Utc> + Send + Sync;

/// Lookup tables shared by every terminal session. Built once, never mutated.
#[derive(Clone)]
pub struct TerminalServices {
    pub registry: Arc<CommandRegistry>,
    pub vfs: Arc<Vfs>,
    pub geofences: Arc<GeofenceRegistry>,
    pub roster: Arc<Roster>,
}

impl TerminalServices {
    pub fn from_config(config: &MissionConfig) -> Self {
        Self {
            registry: Arc::new(CommandRegistry::with_builtins()),
            vfs: Arc::new(Vfs::mission_default()),
            geofences: Arc::new(config.geofence_registry()),
            roster: Arc::new(config.roster()),
        }
    }
}

/// One interactive session: interpreter state plus the shared lookup tables.
pub struct Terminal {
    state: InterpreterState,
    services: TerminalServices,
    clock: Box<ClockFn>,
}

impl Terminal {
    pub fn new(services: TerminalServices) -> Self {
        Self {
            state: InterpreterState::default(),
            services,
            clock: Box::new(Utc::now),
        }
    }

    /// Replaces the wall clock used by `date`.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> &InterpreterState {
        &self.state
    }

    pub fn prompt(&self) -> String {
        self.state.prompt()
    }

    pub fn transcript(&self) -> impl Iterator<Item = &str> {
        self.state.transcript.iter().map(String::as_str)
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn toggle_open(&mut self) {
        self.state.is_open = !self.state.is_open;
    }

    /// Called by the host once its alert presentation has finished.
    pub fn acknowledge_alert(&mut self) {
        self.state.alert_active = false;
    }

    /// Non-empty lines interpreted so far, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.state.history()
    }

    /// Interprets one line. The transcript receives the echoed prompt line and
    /// the output; the returned result carries the actions for the dispatcher.
    pub fn submit(&mut self, line: &str) -> CommandResult {
        let echoed = if self.state.awaiting_password {
            format!("{}{}", self.state.prompt(), "*".repeat(line.chars().count()))
        } else {
            format!("{}{}", self.state.prompt(), line)
        };
        self.state.push_transcript(echoed);

        let result = self.interpret(line);

        self.state.apply_patch(result.patch.clone());
        for output in &result.output {
            self.state.push_transcript(output.clone());
        }
        result
    }

    fn interpret(&mut self, line: &str) -> CommandResult {
        if self.state.puzzle_stage == 1 {
            return self.answer_puzzle(line);
        }
        if self.state.awaiting_password {
            return self.check_password(line);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return CommandResult::line("");
        }
        self.state.record_history(trimmed);

        let tokens: Vec<String> = trimmed.split_whitespace().map(ToString::to_string).collect();
        let (name, args) = match tokens.split_first() {
            Some((name, args)) => (name.as_str(), args),
            None => return CommandResult::line(""),
        };

        let services = &self.services;
        let Some(spec) = services.registry.lookup(name) else {
            debug!(command = name, "command_unknown");
            return CommandResult::line(format!("Unknown: {name}"));
        };
        if spec.admin_only() && !self.state.is_admin {
            debug!(command = spec.name(), "command_denied");
            return CommandResult::line(format!(
                "Permission denied: {} requires operator clearance. Try 'login'.",
                spec.name()
            ));
        }

        let context = CommandContext {
            state: &self.state,
            vfs: &services.vfs,
            geofences: &services.geofences,
            roster: &services.roster,
            registry: &services.registry,
            now: (self.clock)(),
        };
        let result = spec.invoke(&context, args);
        debug!(
            command = spec.name(),
            output_lines = result.output.len(),
            actions = result.actions.len(),
            "command_executed"
        );
        result
    }

    fn answer_puzzle(&self, line: &str) -> CommandResult {
        let lower = line.to_lowercase();
        if PUZZLE_TOKENS.iter().all(|token| lower.contains(token)) {
            info!("puzzle_solved");
            return CommandResult::line("Correct. The relay answers to ground control.")
                .with_patch(StatePatch {
                    puzzle_stage: Some(0),
                    ..StatePatch::default()
                })
                .with_action(Action::unlock("riddle_solved"));
        }
        CommandResult::line("Hint: it is who Major Tom keeps calling.")
    }

    fn check_password(&self, line: &str) -> CommandResult {
        if line.trim().eq_ignore_ascii_case(OPERATOR_PASSWORD) {
            info!("operator_authenticated");
            return CommandResult::line("Access granted. Welcome, operator.")
                .with_patch(StatePatch {
                    is_admin: Some(true),
                    awaiting_password: Some(false),
                    wrong_password_count: Some(0),
                    ..StatePatch::default()
                })
                .with_action(Action::unlock("root_access"))
                .with_action(Action::play_sound("access_granted"));
        }

        let failures = self.state.wrong_password_count + 1;
        if failures >= PASSWORD_LOCKOUT_THRESHOLD {
            warn!(failures, "password_lockout");
            return CommandResult::lines(["Access denied.", "INTRUSION DETECTED. Alert raised."])
                .with_patch(StatePatch {
                    awaiting_password: Some(false),
                    wrong_password_count: Some(0),
                    alert_active: Some(true),
                    ..StatePatch::default()
                })
                .with_action(Action::TriggerAlert {
                    duration_ms: Some(ALERT_DURATION_MS),
                });
        }

        debug!(failures, "password_rejected");
        CommandResult::line(format!(
            "Access denied. {} attempt(s) remaining.",
            PASSWORD_LOCKOUT_THRESHOLD - failures
        ))
        .with_patch(StatePatch {
            awaiting_password: Some(false),
            wrong_password_count: Some(failures),
            ..StatePatch::default()
        })
    }
}
