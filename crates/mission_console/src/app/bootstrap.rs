use mission_core::{FrameClock, MissionConfig, Terminal, TerminalServices, UxvSimulation};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use super::effects::LogEffects;
use super::viewport::HeadlessViewport;

pub(crate) struct AppWiring {
    pub(crate) terminal: Terminal,
    pub(crate) sim: UxvSimulation,
    pub(crate) viewport: HeadlessViewport,
    pub(crate) effects: LogEffects,
    pub(crate) clock: FrameClock,
}

pub(crate) fn build_app() -> Option<AppWiring> {
    init_tracing();
    info!("=== Mission Console Startup ===");

    let config = match MissionConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return None;
        }
    };
    info!(
        geofences = config.geofences.len(),
        roster = config.roster.len(),
        target_tps = config.host.target_tps,
        follow_patrol_waypoints = config.simulation.follow_patrol_waypoints,
        "config_loaded"
    );

    Some(wire(&config))
}

pub(crate) fn wire(config: &MissionConfig) -> AppWiring {
    let clock = FrameClock::from_host_config(&config.host, config.simulation.max_frame_delta_ms);
    AppWiring {
        terminal: Terminal::new(TerminalServices::from_config(config)),
        sim: UxvSimulation::new(config.simulation.clone()),
        viewport: HeadlessViewport::default(),
        effects: LogEffects::default(),
        clock,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
