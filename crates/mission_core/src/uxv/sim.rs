use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::geo::{GeoPoint, METERS_PER_DEGREE};
use crate::viewport::MapViewport;

use super::patrol::{generate_waypoints, PatrolMode, PatrolState};
use super::state::UxvState;
use super::weapons::{clamp_fire_power, Explosion, Laser, Projectile, ShotId, WeaponType};

/// Per-frame report of what the simulation did, for hosts that react with
/// sounds or logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub arrived: bool,
    pub waypoint_reached: bool,
    pub trail_sampled: bool,
    pub shots_expired: usize,
    pub explosions_spawned: usize,
    pub explosions_expired: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UxvSnapshot {
    pub clock_ms: f64,
    pub state: UxvState,
}

#[derive(Debug, Default)]
struct ShotIdAllocator {
    next: u64,
}

impl ShotIdAllocator {
    fn allocate(&mut self) -> ShotId {
        let id = ShotId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Owns one vehicle and advances it once per animation frame. Time only moves
/// when `tick` is handed a new timestamp.
pub struct UxvSimulation {
    config: SimulationConfig,
    state: UxvState,
    rng: StdRng,
    ids: ShotIdAllocator,
    clock_ms: f64,
    last_tick_ms: Option<f64>,
    last_trail_sample_ms: Option<f64>,
}

impl UxvSimulation {
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = UxvState::new(
            config.default_speed_mps,
            config.default_altitude_m,
            config.max_trail_length,
        );
        Self {
            config,
            state,
            rng,
            ids: ShotIdAllocator::default(),
            clock_ms: 0.0,
            last_tick_ms: None,
            last_trail_sample_ms: None,
        }
    }

    pub fn state(&self) -> &UxvState {
        &self.state
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn snapshot(&self) -> UxvSnapshot {
        UxvSnapshot {
            clock_ms: self.clock_ms,
            state: self.state.clone(),
        }
    }

    pub fn start(&mut self, spawn: GeoPoint) {
        self.state.activate(spawn);
        self.last_trail_sample_ms = Some(self.clock_ms);
        info!(lng = spawn.lng, lat = spawn.lat, "uxv_started");
    }

    /// Halts steering only; shots already in flight keep aging out.
    pub fn stop(&mut self) {
        if self.state.is_active() {
            info!(
                in_flight = self.state.projectiles.len() + self.state.lasers.len(),
                "uxv_stopped"
            );
        }
        self.state.deactivate();
    }

    pub fn set_target(&mut self, target: GeoPoint) {
        self.state.set_target(Some(target));
        debug!(lng = target.lng, lat = target.lat, "uxv_target_set");
    }

    pub fn return_to_base(&mut self) {
        if let Some(base) = self.state.base() {
            self.state.set_target(Some(base));
            debug!(lng = base.lng, lat = base.lat, "uxv_returning");
        }
    }

    pub fn set_speed(&mut self, speed_mps: f64) {
        self.state.set_speed(speed_mps);
    }

    pub fn set_altitude(&mut self, altitude_m: f64) {
        self.state.set_altitude(altitude_m);
    }

    pub fn set_follow_camera(&mut self, enabled: bool) {
        self.state.set_follow_camera(enabled);
    }

    pub fn set_max_trail_length(&mut self, max_length: usize) {
        self.state.set_max_trail_length(max_length);
    }

    pub fn set_weapon_type(&mut self, weapon_type: WeaponType) {
        self.state.weapon.set_weapon_type(weapon_type);
    }

    pub fn start_charging(&mut self) {
        self.state.weapon.start_charging();
    }

    pub fn stop_charging(&mut self) {
        self.state.weapon.stop_charging();
    }

    pub fn set_charge_power(&mut self, power: f64) {
        self.state.weapon.set_charge_power(power);
    }

    /// Replaces the waypoint list with a fresh one around the current position.
    pub fn set_patrol_mode(&mut self, mode: PatrolMode) {
        let center = self.state.position().unwrap_or_default();
        let waypoints = generate_waypoints(mode, center, &mut self.rng);
        info!(mode = mode.name(), waypoints = waypoints.len(), "uxv_patrol_set");
        self.state.patrol = PatrolState {
            mode,
            waypoints,
            current_index: 0,
        };
    }

    /// Fires the selected weapon from the vehicle toward the current target
    /// (or straight down when no target is set).
    pub fn drop_payload(&mut self) -> Option<ShotId> {
        if !self.state.is_active() {
            return None;
        }
        let origin = self.state.position()?;
        let aim = self.state.target().unwrap_or(origin);
        match self.state.weapon.weapon_type() {
            WeaponType::Projectile => Some(self.spawn_projectile(origin, aim)),
            _ => {
                let power = self.state.weapon.charge_power();
                self.fire_laser(aim, power)
            }
        }
    }

    pub fn fire_laser(&mut self, target: GeoPoint, power: f64) -> Option<ShotId> {
        if !self.state.is_active() {
            return None;
        }
        let origin = self.state.position()?;
        let power = clamp_fire_power(power);
        let weapon_type = self.state.weapon.weapon_type();
        let duration_ms = weapon_type.beam_duration_ms() * (0.5 + power / 2.0);
        let id = self.ids.allocate();
        self.state.lasers.push(Laser {
            id,
            start: origin,
            end: target,
            start_time_ms: self.clock_ms,
            duration_ms,
            weapon_type,
            power,
        });
        self.state.weapon.discharge();
        debug!(
            id = id.0,
            weapon = weapon_type.name(),
            power,
            duration_ms,
            "laser_fired"
        );
        Some(id)
    }

    fn spawn_projectile(&mut self, origin: GeoPoint, aim: GeoPoint) -> ShotId {
        let id = self.ids.allocate();
        self.state.projectiles.push(Projectile {
            id,
            start: origin,
            end: aim,
            start_time_ms: self.clock_ms,
            duration_ms: self.config.projectile_duration_ms,
            weapon_type: WeaponType::Projectile,
        });
        debug!(id = id.0, "projectile_launched");
        id
    }

    /// Advances one frame. Order within a tick: movement, trail sampling,
    /// camera follow, shot aging, explosion aging, weapon charge.
    pub fn tick(&mut self, now_ms: f64, viewport: &mut dyn MapViewport) -> TickOutcome {
        let dt_seconds = self.advance_clock(now_ms);
        let mut outcome = TickOutcome::default();

        if self.state.is_active() {
            self.integrate_movement(dt_seconds, &mut outcome);
            outcome.trail_sampled = self.sample_trail(now_ms);
            if self.state.follow_camera() {
                if let Some(position) = self.state.position() {
                    viewport.recenter(position);
                }
            }
        }

        self.age_shots(now_ms, &mut outcome);
        self.age_explosions(now_ms, &mut outcome);
        self.state
            .weapon
            .accumulate(dt_seconds, self.config.charge_rate_per_second);
        outcome
    }

    fn advance_clock(&mut self, now_ms: f64) -> f64 {
        if !now_ms.is_finite() {
            return 0.0;
        }
        let dt_ms = match self.last_tick_ms {
            Some(last) => (now_ms - last).clamp(0.0, self.config.max_frame_delta_ms),
            None => 0.0,
        };
        self.last_tick_ms = Some(now_ms);
        self.clock_ms = now_ms;
        dt_ms / 1_000.0
    }

    fn steering_goal(&self) -> Option<(GeoPoint, bool)> {
        if let Some(target) = self.state.target() {
            return Some((target, false));
        }
        if self.config.follow_patrol_waypoints {
            return self
                .state
                .patrol
                .current_waypoint()
                .map(|waypoint| (waypoint, true));
        }
        None
    }

    fn integrate_movement(&mut self, dt_seconds: f64, outcome: &mut TickOutcome) {
        let Some(position) = self.state.position() else {
            return;
        };
        let Some((goal, is_waypoint)) = self.steering_goal() else {
            return;
        };

        let distance = position.distance_deg(goal);
        if distance < self.config.arrival_epsilon_deg {
            self.state.set_position(goal);
            if is_waypoint {
                self.state.patrol.advance();
                outcome.waypoint_reached = true;
            } else {
                self.state.set_target(None);
                outcome.arrived = true;
                info!(lng = goal.lng, lat = goal.lat, "uxv_arrived");
            }
            return;
        }

        let step_deg = (self.state.speed_mps() / METERS_PER_DEGREE * dt_seconds).min(distance);
        self.state.set_position(position.step_toward(goal, step_deg));
    }

    fn sample_trail(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_trail_sample_ms {
            if now_ms - last < self.config.trail_sample_interval_ms {
                return false;
            }
        }
        let Some(position) = self.state.position() else {
            return false;
        };
        let moved = self
            .state
            .trail()
            .back()
            .map_or(true, |last| last.distance_deg(position) > self.config.trail_min_move_deg);
        if !moved {
            return false;
        }
        self.state.push_trail(position);
        self.last_trail_sample_ms = Some(now_ms);
        true
    }

    fn age_shots(&mut self, now_ms: f64, outcome: &mut TickOutcome) {
        let mut detonations: Vec<(GeoPoint, WeaponType)> = Vec::new();

        let in_flight = self.state.projectiles.len() + self.state.lasers.len();
        self.state.projectiles.retain(|shot| {
            if shot.is_expired(now_ms) {
                detonations.push((shot.end, shot.weapon_type));
                false
            } else {
                true
            }
        });
        self.state.lasers.retain(|beam| {
            if !beam.is_expired(now_ms) {
                return true;
            }
            if beam.weapon_type.beam_detonates() {
                detonations.push((beam.end, beam.weapon_type));
            }
            false
        });
        let remaining = self.state.projectiles.len() + self.state.lasers.len();
        outcome.shots_expired = in_flight - remaining;

        for (location, weapon_type) in detonations {
            let id = self.ids.allocate();
            self.state.explosions.push(Explosion {
                id,
                location,
                start_time_ms: now_ms,
                weapon_type,
            });
            outcome.explosions_spawned += 1;
            debug!(id = id.0, weapon = weapon_type.name(), "explosion_spawned");
        }
    }

    fn age_explosions(&mut self, now_ms: f64, outcome: &mut TickOutcome) {
        let before = self.state.explosions.len();
        self.state
            .explosions
            .retain(|explosion| !explosion.is_expired(now_ms));
        outcome.explosions_expired = before - self.state.explosions.len();
    }
}

#[cfg(test)]
mod tests {
    use crate::geo::ScreenPoint;
    use crate::viewport::FlyToRequest;

    use super::*;

    #[derive(Default)]
    struct RecordingViewport {
        center: GeoPoint,
        recenters: Vec<GeoPoint>,
    }

    impl MapViewport for RecordingViewport {
        fn project(&self, point: GeoPoint) -> ScreenPoint {
            ScreenPoint {
                x: point.lng,
                y: point.lat,
            }
        }

        fn fly_to(&mut self, request: FlyToRequest) {
            self.center = request.center;
        }

        fn zoom_to(&mut self, _zoom: f64, _duration_ms: Option<u64>) {}

        fn center(&self) -> GeoPoint {
            self.center
        }

        fn recenter(&mut self, center: GeoPoint) {
            self.center = center;
            self.recenters.push(center);
        }
    }

    fn seeded_sim() -> UxvSimulation {
        UxvSimulation::new(SimulationConfig {
            rng_seed: Some(9),
            ..SimulationConfig::default()
        })
    }

    #[test]
    fn movement_respects_speed_and_flat_earth_scale() {
        let mut sim = seeded_sim();
        let mut viewport = RecordingViewport::default();
        sim.tick(0.0, &mut viewport);
        sim.start(GeoPoint::new(0.0, 0.0));
        sim.set_speed(1_110.0);
        sim.set_target(GeoPoint::new(0.0, 10.0));

        sim.tick(100.0, &mut viewport);
        let position = sim.state().position().expect("position");
        // 1110 m/s for 0.1 s is 111 m, i.e. 0.001 degrees.
        assert!((position.lat - 0.001).abs() < 1e-12);
        assert_eq!(position.lng, 0.0);
    }

    #[test]
    fn frame_delta_is_clamped() {
        let mut sim = seeded_sim();
        let mut viewport = RecordingViewport::default();
        sim.tick(0.0, &mut viewport);
        sim.start(GeoPoint::new(0.0, 0.0));
        sim.set_speed(1_110.0);
        sim.set_target(GeoPoint::new(0.0, 10.0));

        sim.tick(60_000.0, &mut viewport);
        let position = sim.state().position().expect("position");
        assert!((position.lat - 0.0025).abs() < 1e-12);
    }

    #[test]
    fn arrival_snaps_clears_target_and_stays_put() {
        let mut sim = seeded_sim();
        let mut viewport = RecordingViewport::default();
        sim.tick(0.0, &mut viewport);
        sim.start(GeoPoint::new(0.0, 0.0));
        sim.set_target(GeoPoint::new(0.00005, 0.0));

        let outcome = sim.tick(16.0, &mut viewport);
        assert!(outcome.arrived);
        assert_eq!(sim.state().target(), None);
        assert_eq!(sim.state().position(), Some(GeoPoint::new(0.00005, 0.0)));

        let outcome = sim.tick(32.0, &mut viewport);
        assert!(!outcome.arrived);
        assert_eq!(sim.state().position(), Some(GeoPoint::new(0.00005, 0.0)));
    }

    #[test]
    fn trail_samples_at_most_every_interval_and_only_when_moving() {
        let mut sim = seeded_sim();
        let mut viewport = RecordingViewport::default();
        sim.tick(0.0, &mut viewport);
        sim.start(GeoPoint::new(0.0, 0.0));
        sim.set_speed(5_000.0);
        sim.set_target(GeoPoint::new(5.0, 0.0));

        let mut now = 0.0;
        for _ in 0..30 {
            now += 16.0;
            sim.tick(now, &mut viewport);
        }
        // 480 ms of flight: samples at 128, 256, 384 plus the spawn point.
        assert_eq!(sim.state().trail().len(), 4);

        sim.stop();
        sim.start(GeoPoint::new(1.0, 1.0));
        for _ in 0..30 {
            now += 16.0;
            sim.tick(now, &mut viewport);
        }
        assert_eq!(sim.state().trail().len(), 1);
    }

    #[test]
    fn follow_camera_recenters_each_active_frame() {
        let mut sim = seeded_sim();
        let mut viewport = RecordingViewport::default();
        sim.start(GeoPoint::new(3.0, 4.0));
        sim.tick(0.0, &mut viewport);
        assert!(viewport.recenters.is_empty());

        sim.set_follow_camera(true);
        sim.tick(16.0, &mut viewport);
        sim.tick(32.0, &mut viewport);
        assert_eq!(viewport.recenters, vec![GeoPoint::new(3.0, 4.0); 2]);

        sim.stop();
        sim.tick(48.0, &mut viewport);
        assert_eq!(viewport.recenters.len(), 2);
    }

    #[test]
    fn projectile_detonates_exactly_once() {
        let mut sim = seeded_sim();
        let mut viewport = RecordingViewport::default();
        sim.tick(1_000.0, &mut viewport);
        sim.start(GeoPoint::new(0.0, 0.0));
        sim.set_target(GeoPoint::new(1.0, 1.0));
        let id = sim.drop_payload().expect("projectile");
        assert_eq!(sim.state().projectiles()[0].id, id);

        let outcome = sim.tick(2_199.0, &mut viewport);
        assert_eq!(outcome.explosions_spawned, 0);
        assert_eq!(sim.state().projectiles().len(), 1);

        let outcome = sim.tick(2_200.0, &mut viewport);
        assert_eq!(outcome.shots_expired, 1);
        assert_eq!(outcome.explosions_spawned, 1);
        assert!(sim.state().projectiles().is_empty());
        assert_eq!(sim.state().explosions()[0].location, GeoPoint::new(1.0, 1.0));

        let outcome = sim.tick(2_216.0, &mut viewport);
        assert_eq!(outcome.explosions_spawned, 0);
        assert_eq!(sim.state().explosions().len(), 1);
    }

    #[test]
    fn explosions_expire_by_weapon_class() {
        let mut sim = seeded_sim();
        let mut viewport = RecordingViewport::default();
        sim.tick(0.0, &mut viewport);
        sim.start(GeoPoint::new(0.0, 0.0));
        sim.set_weapon_type(WeaponType::Orbital);
        sim.fire_laser(GeoPoint::new(2.0, 2.0), 1.0).expect("beam");

        sim.tick(200.0, &mut viewport);
        sim.tick(2_000.0, &mut viewport);
        assert_eq!(sim.state().explosions().len(), 1);
        sim.tick(3_500.0, &mut viewport);
        assert_eq!(sim.state().explosions().len(), 1);
        let outcome = sim.tick(4_100.0, &mut viewport);
        assert_eq!(outcome.explosions_expired, 1);
        assert!(sim.state().explosions().is_empty());
    }

    #[test]
    fn pulse_beams_fade_without_blast() {
        let mut sim = seeded_sim();
        let mut viewport = RecordingViewport::default();
        sim.tick(0.0, &mut viewport);
        sim.start(GeoPoint::new(0.0, 0.0));
        sim.set_weapon_type(WeaponType::Pulse);
        sim.drop_payload().expect("pulse beam");
        assert_eq!(sim.state().lasers().len(), 1);

        let outcome = sim.tick(200.0, &mut viewport);
        assert_eq!(outcome.shots_expired, 1);
        assert_eq!(outcome.explosions_spawned, 0);
        assert!(sim.state().lasers().is_empty());
    }

    #[test]
    fn fire_laser_clamps_power_and_scales_duration() {
        let mut sim = seeded_sim();
        let mut viewport = RecordingViewport::default();
        sim.tick(0.0, &mut viewport);
        sim.start(GeoPoint::new(0.0, 0.0));
        sim.set_weapon_type(WeaponType::Laser);

        sim.fire_laser(GeoPoint::new(1.0, 0.0), 50.0).expect("beam");
        sim.fire_laser(GeoPoint::new(1.0, 0.0), 0.0).expect("beam");
        let lasers = sim.state().lasers();
        assert_eq!(lasers[0].power, 2.0);
        assert_eq!(lasers[0].duration_ms, 800.0 * 1.5);
        assert_eq!(lasers[1].power, 0.1);
        assert!((lasers[1].duration_ms - 800.0 * 0.55).abs() < 1e-9);
    }

    #[test]
    fn charging_accumulates_on_frame_clock_and_discharges_on_fire() {
        let mut sim = seeded_sim();
        let mut viewport = RecordingViewport::default();
        sim.tick(0.0, &mut viewport);
        sim.start(GeoPoint::new(0.0, 0.0));
        sim.set_weapon_type(WeaponType::Laser);
        sim.start_charging();
        assert_eq!(sim.state().weapon().charge_power(), 0.0);

        sim.tick(250.0, &mut viewport);
        sim.tick(500.0, &mut viewport);
        assert!((sim.state().weapon().charge_power() - 0.5).abs() < 1e-9);

        sim.drop_payload().expect("beam");
        assert_eq!(sim.state().lasers()[0].power, 0.5);
        assert_eq!(sim.state().weapon().charge_power(), 0.0);
        assert!(!sim.state().weapon().is_charging());
    }

    #[test]
    fn stop_leaves_shots_to_decay() {
        let mut sim = seeded_sim();
        let mut viewport = RecordingViewport::default();
        sim.tick(0.0, &mut viewport);
        sim.start(GeoPoint::new(0.0, 0.0));
        sim.set_target(GeoPoint::new(4.0, 0.0));
        sim.drop_payload().expect("projectile");
        sim.stop();

        assert_eq!(sim.state().target(), None);
        assert_eq!(sim.state().projectiles().len(), 1);
        assert!(sim.drop_payload().is_none());

        sim.tick(1_200.0, &mut viewport);
        assert!(sim.state().projectiles().is_empty());
        assert_eq!(sim.state().explosions().len(), 1);
    }

    #[test]
    fn return_to_base_targets_spawn_point() {
        let mut sim = seeded_sim();
        sim.return_to_base();
        assert_eq!(sim.state().target(), None);

        sim.start(GeoPoint::new(7.0, 8.0));
        sim.set_target(GeoPoint::new(0.0, 0.0));
        sim.return_to_base();
        assert_eq!(sim.state().target(), Some(GeoPoint::new(7.0, 8.0)));
    }

    #[test]
    fn patrol_is_cosmetic_unless_traversal_enabled() {
        let mut sim = seeded_sim();
        let mut viewport = RecordingViewport::default();
        sim.tick(0.0, &mut viewport);
        sim.start(GeoPoint::new(0.0, 0.0));
        sim.set_patrol_mode(PatrolMode::Circle);
        assert_eq!(sim.state().patrol().waypoints.len(), 16);

        sim.tick(200.0, &mut viewport);
        assert_eq!(sim.state().position(), Some(GeoPoint::new(0.0, 0.0)));
        assert_eq!(sim.state().patrol().current_index, 0);
    }

    #[test]
    fn patrol_traversal_advances_waypoints_when_enabled() {
        let mut sim = UxvSimulation::new(SimulationConfig {
            rng_seed: Some(3),
            follow_patrol_waypoints: true,
            ..SimulationConfig::default()
        });
        let mut viewport = RecordingViewport::default();
        sim.tick(0.0, &mut viewport);
        sim.start(GeoPoint::new(0.0, 0.0));
        sim.set_speed(10_000.0);
        sim.set_patrol_mode(PatrolMode::Zigzag);
        let first = sim.state().patrol().waypoints[0];

        let mut now = 0.0;
        let mut reached = false;
        for _ in 0..400 {
            now += 100.0;
            if sim.tick(now, &mut viewport).waypoint_reached {
                reached = true;
                break;
            }
        }
        assert!(reached);
        assert_eq!(sim.state().position(), Some(first));
        assert_eq!(sim.state().patrol().current_index, 1);
    }
}
