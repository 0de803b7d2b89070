pub(crate) mod bootstrap;
pub(crate) mod effects;
pub(crate) mod input;
pub(crate) mod loop_runner;
pub(crate) mod viewport;
