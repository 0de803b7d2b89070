//! Mission-control core: the terminal command interpreter, the action
//! dispatcher, and the UXV vehicle simulation it drives.

pub mod action;
pub mod config;
pub mod dispatch;
pub mod frame_clock;
pub mod geo;
pub mod geofence;
pub mod roster;
pub mod terminal;
pub mod uxv;
pub mod vfs;
pub mod viewport;

pub use action::Action;
pub use config::{
    ConfigError, HostConfig, MissionConfig, SimulationConfig, StartupError, CONFIG_ENV_VAR,
};
pub use dispatch::{ActionDispatcher, EffectSink, NoopEffects};
pub use frame_clock::{FrameClock, StepPlan};
pub use geo::{BoundingBox, GeoPoint, ScreenPoint, METERS_PER_DEGREE};
pub use geofence::{Geofence, GeofenceRegistry};
pub use roster::{Roster, RosterEntry};
pub use terminal::{CommandResult, StatePatch, Terminal, TerminalServices};
pub use uxv::{TickOutcome, UxvSimulation, UxvSnapshot, UxvState};
pub use vfs::Vfs;
pub use viewport::{FlyToRequest, MapViewport};
