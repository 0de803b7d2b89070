//! Real-time vehicle simulation: movement toward a target, a bounded trail,
//! weapon charging, shot and blast lifecycles, and patrol waypoint generation.

mod patrol;
mod sim;
mod state;
mod weapons;

pub use patrol::{generate_waypoints, PatrolMode, PatrolState};
pub use sim::{TickOutcome, UxvSimulation, UxvSnapshot};
pub use state::{
    clamp_altitude, clamp_speed, clamp_trail_length, UxvState, ALTITUDE_MAX_M, ALTITUDE_MIN_M,
    SPEED_MAX_MPS, SPEED_MIN_MPS,
};
pub use weapons::{
    clamp_fire_power, Explosion, Laser, Projectile, ShotId, WeaponState, WeaponType, CHARGE_MAX,
    CHARGE_MIN, FIRE_POWER_MAX, FIRE_POWER_MIN,
};
