use crate::action::Action;

/// Partial update of `InterpreterState`; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
    pub is_open: Option<bool>,
    pub awaiting_password: Option<bool>,
    pub is_admin: Option<bool>,
    pub wrong_password_count: Option<u32>,
    pub alert_active: Option<bool>,
    pub puzzle_stage: Option<u32>,
    pub working_directory: Option<String>,
    pub clear_transcript: bool,
}

impl StatePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandResult {
    pub output: Vec<String>,
    pub patch: StatePatch,
    pub actions: Vec<Action>,
}

impl CommandResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn line(line: impl Into<String>) -> Self {
        Self {
            output: vec![line.into()],
            ..Self::default()
        }
    }

    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_patch(mut self, patch: StatePatch) -> Self {
        self.patch = patch;
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}
