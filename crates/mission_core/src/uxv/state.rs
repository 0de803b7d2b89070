use std::collections::VecDeque;

use serde::Serialize;

use crate::config::{TRAIL_LENGTH_MAX, TRAIL_LENGTH_MIN};
use crate::geo::GeoPoint;

use super::patrol::PatrolState;
use super::weapons::{Explosion, Laser, Projectile, WeaponState};

pub const SPEED_MIN_MPS: f64 = 50.0;
pub const SPEED_MAX_MPS: f64 = 10_000.0;
pub const ALTITUDE_MIN_M: f64 = 100.0;
pub const ALTITUDE_MAX_M: f64 = 5_000.0;

/// Vehicle state. Numeric settings are clamped on every write, so the ranges
/// hold no matter which path mutated them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UxvState {
    active: bool,
    position: Option<GeoPoint>,
    target: Option<GeoPoint>,
    base: Option<GeoPoint>,
    trail: VecDeque<GeoPoint>,
    max_trail_length: usize,
    speed_mps: f64,
    follow_camera: bool,
    altitude_m: f64,
    pub(crate) weapon: WeaponState,
    pub(crate) patrol: PatrolState,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) lasers: Vec<Laser>,
    pub(crate) explosions: Vec<Explosion>,
}

impl UxvState {
    pub fn new(speed_mps: f64, altitude_m: f64, max_trail_length: usize) -> Self {
        Self {
            active: false,
            position: None,
            target: None,
            base: None,
            trail: VecDeque::new(),
            max_trail_length: clamp_trail_length(max_trail_length),
            speed_mps: clamp_speed(speed_mps),
            follow_camera: false,
            altitude_m: clamp_altitude(altitude_m),
            weapon: WeaponState::default(),
            patrol: PatrolState::default(),
            projectiles: Vec::new(),
            lasers: Vec::new(),
            explosions: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn position(&self) -> Option<GeoPoint> {
        self.position
    }

    pub fn target(&self) -> Option<GeoPoint> {
        self.target
    }

    pub fn base(&self) -> Option<GeoPoint> {
        self.base
    }

    pub fn trail(&self) -> &VecDeque<GeoPoint> {
        &self.trail
    }

    pub fn max_trail_length(&self) -> usize {
        self.max_trail_length
    }

    pub fn speed_mps(&self) -> f64 {
        self.speed_mps
    }

    pub fn follow_camera(&self) -> bool {
        self.follow_camera
    }

    pub fn altitude_m(&self) -> f64 {
        self.altitude_m
    }

    pub fn weapon(&self) -> &WeaponState {
        &self.weapon
    }

    pub fn patrol(&self) -> &PatrolState {
        &self.patrol
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub(crate) fn activate(&mut self, spawn: GeoPoint) {
        self.active = true;
        self.position = Some(spawn);
        self.base = Some(spawn);
        self.target = None;
        self.trail.clear();
        self.trail.push_back(spawn);
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
        self.target = None;
    }

    pub(crate) fn set_position(&mut self, position: GeoPoint) {
        self.position = Some(position);
    }

    pub(crate) fn set_target(&mut self, target: Option<GeoPoint>) {
        self.target = target;
    }

    pub fn set_speed(&mut self, speed_mps: f64) {
        self.speed_mps = clamp_speed(speed_mps);
    }

    pub fn set_altitude(&mut self, altitude_m: f64) {
        self.altitude_m = clamp_altitude(altitude_m);
    }

    pub fn set_follow_camera(&mut self, enabled: bool) {
        self.follow_camera = enabled;
    }

    /// Shrinking the limit evicts the oldest samples immediately.
    pub fn set_max_trail_length(&mut self, max_length: usize) {
        self.max_trail_length = clamp_trail_length(max_length);
        self.evict_trail_overflow();
    }

    pub(crate) fn push_trail(&mut self, point: GeoPoint) {
        self.trail.push_back(point);
        self.evict_trail_overflow();
    }

    fn evict_trail_overflow(&mut self) {
        while self.trail.len() > self.max_trail_length {
            self.trail.pop_front();
        }
    }
}

pub fn clamp_speed(speed_mps: f64) -> f64 {
    if speed_mps.is_nan() {
        return SPEED_MIN_MPS;
    }
    speed_mps.clamp(SPEED_MIN_MPS, SPEED_MAX_MPS)
}

pub fn clamp_altitude(altitude_m: f64) -> f64 {
    if altitude_m.is_nan() {
        return ALTITUDE_MIN_M;
    }
    altitude_m.clamp(ALTITUDE_MIN_M, ALTITUDE_MAX_M)
}

pub fn clamp_trail_length(max_length: usize) -> usize {
    max_length.clamp(TRAIL_LENGTH_MIN, TRAIL_LENGTH_MAX)
}
