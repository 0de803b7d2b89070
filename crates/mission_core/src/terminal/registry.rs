use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::geofence::GeofenceRegistry;
use crate::roster::Roster;
use crate::vfs::Vfs;

use super::result::CommandResult;
use super::state::InterpreterState;

/// Read-only view handed to every command handler.
pub struct CommandContext<'a> {
    pub state: &'a InterpreterState,
    pub vfs: &'a Vfs,
    pub geofences: &'a GeofenceRegistry,
    pub roster: &'a Roster,
    pub registry: &'a CommandRegistry,
    pub now: DateTime<Utc>,
}

type HandlerFn = dyn Fn(&CommandContext<'_>, &[String]) -> CommandResult + Send + Sync;

pub struct CommandSpec {
    name: String,
    help: String,
    arg_schema: String,
    admin_only: bool,
    handler: Box<HandlerFn>,
}

impl CommandSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn arg_schema(&self) -> &str {
        &self.arg_schema
    }

    pub fn admin_only(&self) -> bool {
        self.admin_only
    }

    pub fn usage(&self) -> String {
        if self.arg_schema.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.arg_schema)
        }
    }

    pub(crate) fn invoke(&self, context: &CommandContext<'_>, args: &[String]) -> CommandResult {
        (self.handler)(context, args)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("command name cannot be empty")]
    EmptyName,
    #[error("duplicate command registration: {0}")]
    Duplicate(String),
}

/// Command table keyed case-insensitively, kept in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    specs: Vec<CommandSpec>,
    lookup_by_lower_name: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        arg_schema: impl Into<String>,
        admin_only: bool,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&CommandContext<'_>, &[String]) -> CommandResult + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let lower = name.to_ascii_lowercase();
        if self.lookup_by_lower_name.contains_key(&lower) {
            return Err(RegistryError::Duplicate(name));
        }

        self.specs.push(CommandSpec {
            name,
            help: help.into(),
            arg_schema: arg_schema.into(),
            admin_only,
            handler: Box::new(handler),
        });
        self.lookup_by_lower_name
            .insert(lower, self.specs.len() - 1);
        Ok(())
    }

    pub fn lookup(&self, input_name: &str) -> Option<&CommandSpec> {
        let lower = input_name.to_ascii_lowercase();
        let index = self.lookup_by_lower_name.get(&lower)?;
        self.specs.get(*index)
    }

    pub fn iter_specs_in_order(&self) -> impl Iterator<Item = &CommandSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
