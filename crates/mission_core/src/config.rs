//! Mission configuration: simulation tuning, geofences, roster and host loop settings.
//!
//! Loaded from JSON. The builtin document ships inside the binary; `MISSION_CONFIG`
//! points the host at an override file.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::geofence::{Geofence, GeofenceRegistry};
use crate::roster::{Roster, RosterEntry};

pub const BUILTIN_MISSION_CONFIG: &str = include_str!("data/mission_config.json");
pub const CONFIG_ENV_VAR: &str = "MISSION_CONFIG";

pub const TRAIL_LENGTH_MIN: usize = 10;
pub const TRAIL_LENGTH_MAX: usize = 200;
pub const MAX_FRAME_DELTA_MS_LIMIT: f64 = 10_000.0;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub simulation: SimulationConfig,
    pub geofences: Vec<Geofence>,
    pub roster: Vec<RosterEntry>,
    pub host: HostConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub max_trail_length: usize,
    pub trail_sample_interval_ms: f64,
    pub trail_min_move_deg: f64,
    pub arrival_epsilon_deg: f64,
    pub default_speed_mps: f64,
    pub default_altitude_m: f64,
    pub charge_rate_per_second: f64,
    pub projectile_duration_ms: f64,
    pub max_frame_delta_ms: f64,
    pub follow_patrol_waypoints: bool,
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_trail_length: 60,
            trail_sample_interval_ms: 120.0,
            trail_min_move_deg: 1e-6,
            arrival_epsilon_deg: 1e-4,
            default_speed_mps: 500.0,
            default_altitude_m: 1_000.0,
            charge_rate_per_second: 1.0,
            projectile_duration_ms: 1_200.0,
            max_frame_delta_ms: 250.0,
            follow_patrol_waypoints: false,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub target_tps: u32,
    pub max_ticks_per_frame: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_ticks_per_frame: 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config at {path}: {message}")]
    Parse { path: String, message: String },
    #[error("validation failed at {path}: {message}")]
    Invalid { path: String, message: String },
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MissionConfig {
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_MISSION_CONFIG).expect("builtin mission config should parse")
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config: MissionConfig = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|error| {
                let path = error.path().to_string();
                ConfigError::Parse {
                    path: if path.is_empty() { ".".to_string() } else { path },
                    message: error.into_inner().to_string(),
                }
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Loads the file named by `MISSION_CONFIG`, or the builtin document when unset.
    pub fn from_env() -> Result<Self, StartupError> {
        match env::var(CONFIG_ENV_VAR) {
            Ok(value) => Ok(Self::from_file(Path::new(&value))?),
            Err(env::VarError::NotPresent) => Ok(Self::builtin()),
            Err(source) => Err(StartupError::EnvVar {
                var: CONFIG_ENV_VAR,
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !(TRAIL_LENGTH_MIN..=TRAIL_LENGTH_MAX).contains(&sim.max_trail_length) {
            return Err(invalid(
                "simulation.max_trail_length",
                format!(
                    "expected {TRAIL_LENGTH_MIN}..={TRAIL_LENGTH_MAX}, got {}",
                    sim.max_trail_length
                ),
            ));
        }
        for (path, value) in [
            ("simulation.trail_sample_interval_ms", sim.trail_sample_interval_ms),
            ("simulation.trail_min_move_deg", sim.trail_min_move_deg),
            ("simulation.charge_rate_per_second", sim.charge_rate_per_second),
            ("simulation.projectile_duration_ms", sim.projectile_duration_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(
                    path,
                    format!("expected finite non-negative number, got {value}"),
                ));
            }
        }
        // Arrival is `distance < epsilon`, so zero would never clear the target.
        if !(sim.arrival_epsilon_deg.is_finite() && sim.arrival_epsilon_deg > 0.0) {
            return Err(invalid(
                "simulation.arrival_epsilon_deg",
                format!("expected finite positive number, got {}", sim.arrival_epsilon_deg),
            ));
        }
        let frame_delta = sim.max_frame_delta_ms;
        if !(frame_delta > 0.0 && frame_delta <= MAX_FRAME_DELTA_MS_LIMIT) {
            return Err(invalid(
                "simulation.max_frame_delta_ms",
                format!("expected (0, {MAX_FRAME_DELTA_MS_LIMIT}], got {frame_delta}"),
            ));
        }
        if !sim.default_speed_mps.is_finite() {
            return Err(invalid("simulation.default_speed_mps", "expected finite number"));
        }
        if !sim.default_altitude_m.is_finite() {
            return Err(invalid("simulation.default_altitude_m", "expected finite number"));
        }
        if self.host.target_tps == 0 {
            return Err(invalid("host.target_tps", "expected at least 1"));
        }

        let mut seen = HashSet::new();
        for (index, fence) in self.geofences.iter().enumerate() {
            if fence.key.trim().is_empty() {
                return Err(invalid(&format!("geofences[{index}].key"), "key cannot be empty"));
            }
            if !seen.insert(fence.key.to_ascii_lowercase()) {
                return Err(invalid(
                    &format!("geofences[{index}].key"),
                    format!("duplicate geofence key '{}'", fence.key),
                ));
            }
            if !fence.bbox.is_well_formed() {
                return Err(invalid(
                    &format!("geofences[{index}].bbox"),
                    "expected finite bounds with min <= max",
                ));
            }
        }
        for (index, entry) in self.roster.iter().enumerate() {
            if !entry.location().is_valid() {
                return Err(invalid(
                    &format!("roster[{index}]"),
                    format!("'{}' has an off-globe location", entry.name),
                ));
            }
        }
        Ok(())
    }

    pub fn geofence_registry(&self) -> GeofenceRegistry {
        GeofenceRegistry::new(self.geofences.clone())
    }

    pub fn roster(&self) -> Roster {
        Roster::new(self.roster.clone())
    }
}

fn invalid(path: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        path: path.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builtin_config_parses_and_validates() {
        let config = MissionConfig::builtin();
        assert!(!config.geofences.is_empty());
        assert!(!config.roster.is_empty());
        assert_eq!(config.simulation.trail_sample_interval_ms, 120.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = MissionConfig::from_json_str("{}").expect("empty config");
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.host, HostConfig::default());
        assert!(config.geofences.is_empty());
    }

    #[test]
    fn parse_error_names_json_path() {
        let error = MissionConfig::from_json_str(r#"{"simulation":{"max_trail_length":"lots"}}"#)
            .expect_err("string trail length");
        let message = error.to_string();
        assert!(
            message.starts_with("parse config at simulation.max_trail_length:"),
            "{message}"
        );
    }

    #[test]
    fn trail_length_outside_range_is_rejected() {
        let error = MissionConfig::from_json_str(r#"{"simulation":{"max_trail_length":500}}"#)
            .expect_err("too long");
        assert!(matches!(
            error,
            ConfigError::Invalid { ref path, .. } if path == "simulation.max_trail_length"
        ));
    }

    #[test]
    fn frame_delta_must_be_positive_and_bounded() {
        for raw in [
            r#"{"simulation":{"max_frame_delta_ms":1e300}}"#,
            r#"{"simulation":{"max_frame_delta_ms":10000.5}}"#,
            r#"{"simulation":{"max_frame_delta_ms":0}}"#,
        ] {
            assert!(
                matches!(
                    MissionConfig::from_json_str(raw),
                    Err(ConfigError::Invalid { ref path, .. })
                        if path == "simulation.max_frame_delta_ms"
                ),
                "{raw}"
            );
        }
        let config =
            MissionConfig::from_json_str(r#"{"simulation":{"max_frame_delta_ms":10000}}"#)
                .expect("upper bound is inclusive");
        assert_eq!(config.simulation.max_frame_delta_ms, MAX_FRAME_DELTA_MS_LIMIT);
    }

    #[test]
    fn zero_arrival_epsilon_is_rejected() {
        let error = MissionConfig::from_json_str(r#"{"simulation":{"arrival_epsilon_deg":0}}"#)
            .expect_err("zero epsilon");
        assert!(matches!(
            error,
            ConfigError::Invalid { ref path, .. } if path == "simulation.arrival_epsilon_deg"
        ));
    }

    #[test]
    fn duplicate_and_inverted_geofences_are_rejected() {
        let duplicate = r#"{"geofences":[
            {"key":"a","bbox":{"min_lng":0,"max_lng":1,"min_lat":0,"max_lat":1}},
            {"key":"A","bbox":{"min_lng":0,"max_lng":1,"min_lat":0,"max_lat":1}}
        ]}"#;
        assert!(matches!(
            MissionConfig::from_json_str(duplicate),
            Err(ConfigError::Invalid { ref path, .. }) if path == "geofences[1].key"
        ));

        let inverted = r#"{"geofences":[
            {"key":"a","bbox":{"min_lng":5,"max_lng":1,"min_lat":0,"max_lat":1}}
        ]}"#;
        assert!(matches!(
            MissionConfig::from_json_str(inverted),
            Err(ConfigError::Invalid { ref path, .. }) if path == "geofences[0].bbox"
        ));
    }

    #[test]
    fn from_file_reads_and_reports_missing_files() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"simulation":{{"max_trail_length":12}},"host":{{"target_tps":30}}}}"#
        )
        .expect("write config");
        let config = MissionConfig::from_file(file.path()).expect("config from file");
        assert_eq!(config.simulation.max_trail_length, 12);
        assert_eq!(config.host.target_tps, 30);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            MissionConfig::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
