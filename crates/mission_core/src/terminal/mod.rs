mod commands;
mod interpreter;
mod registry;
mod result;
mod state;

pub use commands::{ALERT_DURATION_MS, HQ_ZOOM, ZOOM_MAX, ZOOM_MIN};
pub use interpreter::{
    Terminal, TerminalServices, OPERATOR_PASSWORD, PASSWORD_LOCKOUT_THRESHOLD,
};
pub use registry::{CommandContext, CommandRegistry, CommandSpec, RegistryError};
pub use result::{CommandResult, StatePatch};
pub use state::{InterpreterState, MAX_HISTORY_LINES, MAX_TRANSCRIPT_LINES, PASSWORD_PROMPT};
