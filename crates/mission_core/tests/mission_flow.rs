use mission_core::uxv::PatrolMode;
use mission_core::{
    ActionDispatcher, EffectSink, FlyToRequest, FrameClock, GeoPoint, MapViewport,
    MissionConfig, ScreenPoint, SimulationConfig, Terminal, TerminalServices, UxvSimulation,
};

#[derive(Default)]
struct StubViewport {
    center: GeoPoint,
    flights: Vec<FlyToRequest>,
}

impl MapViewport for StubViewport {
    fn project(&self, point: GeoPoint) -> ScreenPoint {
        ScreenPoint {
            x: point.lng,
            y: point.lat,
        }
    }

    fn fly_to(&mut self, request: FlyToRequest) {
        self.center = request.center;
        self.flights.push(request);
    }

    fn zoom_to(&mut self, _zoom: f64, _duration_ms: Option<u64>) {}

    fn center(&self) -> GeoPoint {
        self.center
    }
}

#[derive(Default)]
struct CountingEffects {
    sounds: Vec<String>,
    unlocked: Vec<String>,
    alerts: usize,
}

impl EffectSink for CountingEffects {
    fn play_effect(&mut self, id: &str) {
        self.sounds.push(id.to_string());
    }

    fn unlock(&mut self, id: &str) {
        self.unlocked.push(id.to_string());
    }

    fn trigger_alert(&mut self, _duration_ms: Option<u64>) {
        self.alerts += 1;
    }
}

struct Mission {
    terminal: Terminal,
    sim: UxvSimulation,
    viewport: StubViewport,
    effects: CountingEffects,
}

impl Mission {
    fn new(simulation: SimulationConfig) -> Self {
        let config = MissionConfig::builtin();
        Self {
            terminal: Terminal::new(TerminalServices::from_config(&config)),
            sim: UxvSimulation::new(simulation),
            viewport: StubViewport::default(),
            effects: CountingEffects::default(),
        }
    }

    fn run(&mut self, line: &str) -> Vec<String> {
        let result = self.terminal.submit(line);
        ActionDispatcher::new(&mut self.sim, &mut self.viewport, &mut self.effects)
            .apply_all(result.actions);
        result.output
    }
}

fn seeded(simulation: SimulationConfig) -> SimulationConfig {
    SimulationConfig {
        rng_seed: Some(42),
        ..simulation
    }
}

#[test]
fn vehicle_converges_on_commanded_target() {
    let mut mission = Mission::new(seeded(SimulationConfig::default()));
    mission.run("uxv start 0 0");
    mission.run("uxv speed 1000");
    mission.run("uxv goto 10 10");

    let epsilon = SimulationConfig::default().arrival_epsilon_deg;
    let mut now_ms = 0.0;
    let mut arrived = false;
    for _ in 0..10_000 {
        let outcome = mission.sim.tick(now_ms, &mut mission.viewport);
        if outcome.arrived {
            arrived = true;
            break;
        }
        now_ms += 250.0;
    }

    assert!(arrived, "vehicle never arrived");
    let state = mission.sim.state();
    let position = state.position().expect("position");
    assert!(position.distance_deg(GeoPoint::new(10.0, 10.0)) < epsilon);
    assert_eq!(state.target(), None);
    assert!(state.trail().len() <= state.max_trail_length());

    let before = mission.sim.state().position();
    mission.sim.tick(now_ms + 250.0, &mut mission.viewport);
    assert_eq!(mission.sim.state().position(), before);
}

#[test]
fn frame_clock_drives_simulation_deterministically() {
    let mut mission = Mission::new(seeded(SimulationConfig::default()));
    mission.run("uxv start 0 0");
    mission.run("uxv speed 10000");
    mission.run("uxv goto 0.5 0");

    let mut clock = FrameClock::new(60, std::time::Duration::from_millis(250), 5);
    for _ in 0..600 {
        let plan = clock.advance(std::time::Duration::from_millis(16));
        for _ in 0..plan.ticks_to_run {
            let now_ms = clock.next_tick_ms();
            mission.sim.tick(now_ms, &mut mission.viewport);
        }
    }

    let latest = mission.sim.snapshot();
    assert_eq!(latest.state.target(), None);
    assert_eq!(latest.state.position(), Some(GeoPoint::new(0.5, 0.0)));
    let json = serde_json::to_value(&latest).expect("snapshot serializes");
    assert_eq!(json["state"]["active"], serde_json::Value::Bool(true));
}

#[test]
fn repeated_wrong_passwords_reach_the_alert_sink() {
    let mut mission = Mission::new(seeded(SimulationConfig::default()));
    for attempt in ["wrong1", "wrong2", "wrong3"] {
        mission.run("login");
        mission.run(attempt);
    }

    assert_eq!(mission.effects.alerts, 1);
    assert!(mission.terminal.state().alert_active);
    assert_eq!(mission.terminal.state().wrong_password_count, 0);

    mission.run("login");
    mission.run("skywatch");
    assert!(mission.terminal.state().is_admin);
    assert_eq!(mission.effects.unlocked, vec!["root_access"]);
    assert_eq!(mission.effects.sounds, vec!["access_granted"]);
}

#[test]
fn goto_moves_the_camera_and_start_uses_it_as_spawn() {
    let mut mission = Mission::new(seeded(SimulationConfig::default()));
    mission.run("goto sahara");
    assert_eq!(mission.viewport.flights.len(), 1);

    mission.run("uxv start");
    assert_eq!(
        mission.sim.state().position(),
        Some(GeoPoint::new(9.0, 24.0))
    );
}

#[test]
fn bad_arguments_leave_simulation_untouched() {
    let mut mission = Mission::new(seeded(SimulationConfig::default()));
    mission.run("uxv start 0 0");
    let before = mission.sim.state().clone();

    let output = mission.run("uxv speed fast");
    assert_eq!(output, vec!["usage: uxv speed <mps>"]);
    mission.run("uxv goto 500 0");
    mission.run("uxv patrol spiral");

    assert_eq!(mission.sim.state(), &before);
}

#[test]
fn projectile_detonates_once() {
    let mut mission = Mission::new(seeded(SimulationConfig::default()));
    mission.sim.tick(0.0, &mut mission.viewport);
    mission.run("uxv start 0 0");
    mission.run("uxv drop");
    assert_eq!(mission.sim.state().projectiles().len(), 1);

    let mut spawned = 0;
    let mut now_ms = 0.0;
    while now_ms <= 3_000.0 {
        now_ms += 100.0;
        spawned += mission.sim.tick(now_ms, &mut mission.viewport).explosions_spawned;
    }
    assert_eq!(spawned, 1);
    assert!(mission.sim.state().projectiles().is_empty());
    assert!(mission.sim.state().explosions().is_empty());
}

#[test]
fn patrol_is_cosmetic_unless_traversal_is_enabled() {
    let mut idle = Mission::new(seeded(SimulationConfig::default()));
    idle.sim.tick(0.0, &mut idle.viewport);
    idle.run("uxv start 0 0");
    idle.run("uxv patrol circle");
    for step in 1..=20 {
        idle.sim.tick(step as f64 * 100.0, &mut idle.viewport);
    }
    assert_eq!(idle.sim.state().position(), Some(GeoPoint::new(0.0, 0.0)));
    assert_eq!(idle.sim.state().patrol().current_index, 0);

    let mut patrolling = Mission::new(seeded(SimulationConfig {
        follow_patrol_waypoints: true,
        ..SimulationConfig::default()
    }));
    patrolling.sim.tick(0.0, &mut patrolling.viewport);
    patrolling.run("uxv start 0 0");
    patrolling.run("uxv speed 10000");
    patrolling.run("uxv patrol circle");
    assert_eq!(patrolling.sim.state().patrol().mode, PatrolMode::Circle);

    let mut reached = false;
    for step in 1..=200 {
        let outcome = patrolling
            .sim
            .tick(step as f64 * 100.0, &mut patrolling.viewport);
        if outcome.waypoint_reached {
            reached = true;
            break;
        }
    }
    assert!(reached);
    assert_eq!(patrolling.sim.state().patrol().current_index, 1);
}

#[test]
fn cosmetic_commands_route_to_effects() {
    let mut mission = Mission::new(seeded(SimulationConfig::default()));
    mission.run("scan");
    assert_eq!(mission.effects.unlocked, vec!["scanner"]);
    assert_eq!(mission.effects.sounds, vec!["scan"]);

    let before = mission.sim.state().clone();
    mission.run("sudo su");
    assert_eq!(mission.effects.alerts, 1);
    assert_eq!(mission.sim.state(), &before);
    assert!(mission.terminal.submit("echo ok").actions.is_empty());
}
