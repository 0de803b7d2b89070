use serde::Serialize;

use crate::geo::GeoPoint;

pub const CHARGE_MIN: f64 = 0.0;
pub const CHARGE_MAX: f64 = 2.0;
pub const FIRE_POWER_MIN: f64 = 0.1;
pub const FIRE_POWER_MAX: f64 = 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    #[default]
    Projectile,
    Laser,
    Pulse,
    Orbital,
}

impl WeaponType {
    pub const ALL: [WeaponType; 4] = [
        WeaponType::Projectile,
        WeaponType::Laser,
        WeaponType::Pulse,
        WeaponType::Orbital,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "projectile" | "missile" => Some(Self::Projectile),
            "laser" => Some(Self::Laser),
            "pulse" => Some(Self::Pulse),
            "orbital" => Some(Self::Orbital),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Projectile => "projectile",
            Self::Laser => "laser",
            Self::Pulse => "pulse",
            Self::Orbital => "orbital",
        }
    }

    /// Nominal beam lifetime at power 1.0.
    pub fn beam_duration_ms(self) -> f64 {
        match self {
            Self::Pulse => 150.0,
            Self::Projectile => 400.0,
            Self::Laser => 800.0,
            Self::Orbital => 2_000.0,
        }
    }

    /// Pulse is the lowest-damage class; its beams fade without a blast.
    pub fn beam_detonates(self) -> bool {
        !matches!(self, Self::Pulse)
    }

    pub fn explosion_max_age_ms(self) -> f64 {
        match self {
            Self::Orbital => 2_000.0,
            _ => 1_000.0,
        }
    }

    pub fn explosion_peak_radius_m(self) -> f64 {
        match self {
            Self::Pulse => 40.0,
            Self::Laser => 80.0,
            Self::Projectile => 120.0,
            Self::Orbital => 600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeaponState {
    weapon_type: WeaponType,
    charge_power: f64,
    charging: bool,
}

impl WeaponState {
    pub fn weapon_type(&self) -> WeaponType {
        self.weapon_type
    }

    pub fn charge_power(&self) -> f64 {
        self.charge_power
    }

    pub fn is_charging(&self) -> bool {
        self.charging
    }

    /// Switching weapons drops any stored charge.
    pub fn set_weapon_type(&mut self, weapon_type: WeaponType) {
        if self.weapon_type != weapon_type {
            self.charge_power = CHARGE_MIN;
            self.charging = false;
        }
        self.weapon_type = weapon_type;
    }

    pub fn start_charging(&mut self) {
        self.charging = true;
    }

    pub fn stop_charging(&mut self) {
        self.charging = false;
    }

    pub fn set_charge_power(&mut self, power: f64) {
        self.charge_power = clamp_fire_power(power);
    }

    pub(crate) fn accumulate(&mut self, dt_seconds: f64, rate_per_second: f64) {
        if !self.charging {
            return;
        }
        let next = self.charge_power + rate_per_second * dt_seconds;
        self.charge_power = if next.is_finite() {
            next.clamp(CHARGE_MIN, CHARGE_MAX)
        } else {
            CHARGE_MIN
        };
    }

    pub(crate) fn discharge(&mut self) {
        self.charge_power = CHARGE_MIN;
        self.charging = false;
    }
}

pub fn clamp_fire_power(power: f64) -> f64 {
    if !power.is_finite() {
        return FIRE_POWER_MIN;
    }
    power.clamp(FIRE_POWER_MIN, FIRE_POWER_MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ShotId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projectile {
    pub id: ShotId,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub start_time_ms: f64,
    pub duration_ms: f64,
    pub weapon_type: WeaponType,
}

impl Projectile {
    pub fn progress(&self, now_ms: f64) -> f64 {
        flight_progress(self.start_time_ms, self.duration_ms, now_ms)
    }

    /// Interpolated position along the flight line.
    pub fn position_at(&self, now_ms: f64) -> GeoPoint {
        let t = self.progress(now_ms);
        GeoPoint {
            lng: self.start.lng + (self.end.lng - self.start.lng) * t,
            lat: self.start.lat + (self.end.lat - self.start.lat) * t,
        }
    }

    pub(crate) fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.start_time_ms >= self.duration_ms
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Laser {
    pub id: ShotId,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub start_time_ms: f64,
    pub duration_ms: f64,
    pub weapon_type: WeaponType,
    pub power: f64,
}

impl Laser {
    pub fn progress(&self, now_ms: f64) -> f64 {
        flight_progress(self.start_time_ms, self.duration_ms, now_ms)
    }

    pub(crate) fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.start_time_ms >= self.duration_ms
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explosion {
    pub id: ShotId,
    pub location: GeoPoint,
    pub start_time_ms: f64,
    pub weapon_type: WeaponType,
}

impl Explosion {
    pub fn age_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.start_time_ms).max(0.0)
    }

    /// Ease-out growth toward the weapon's peak radius over the blast lifetime.
    pub fn radius_m(&self, now_ms: f64) -> f64 {
        let max_age = self.weapon_type.explosion_max_age_ms();
        let t = (self.age_ms(now_ms) / max_age).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - t).powi(3);
        self.weapon_type.explosion_peak_radius_m() * eased
    }

    pub(crate) fn is_expired(&self, now_ms: f64) -> bool {
        self.age_ms(now_ms) > self.weapon_type.explosion_max_age_ms()
    }
}

fn flight_progress(start_time_ms: f64, duration_ms: f64, now_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    ((now_ms - start_time_ms) / duration_ms).clamp(0.0, 1.0)
}
