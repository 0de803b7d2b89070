use std::f64::consts::TAU;

use rand::Rng;
use serde::Serialize;

use crate::geo::GeoPoint;

pub const CIRCLE_WAYPOINTS: usize = 16;
pub const FIGURE8_WAYPOINTS: usize = 32;
pub const RANDOM_WAYPOINTS: usize = 12;
pub const ZIGZAG_WAYPOINTS: usize = 20;

const CIRCLE_RADIUS_LNG_DEG: f64 = 0.6;
const CIRCLE_RADIUS_LAT_DEG: f64 = 0.4;
const FIGURE8_SCALE_DEG: f64 = 0.8;
const ZIGZAG_SWEEP_DEG: f64 = 2.0;
const ZIGZAG_AMPLITUDE_DEG: f64 = 0.3;
const RANDOM_MAX_LAT_DEG: f64 = 80.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatrolMode {
    #[default]
    None,
    Circle,
    Figure8,
    Random,
    Zigzag,
}

impl PatrolMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "none" | "off" => Some(Self::None),
            "circle" => Some(Self::Circle),
            "figure8" | "figure-8" => Some(Self::Figure8),
            "random" => Some(Self::Random),
            "zigzag" => Some(Self::Zigzag),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Circle => "circle",
            Self::Figure8 => "figure8",
            Self::Random => "random",
            Self::Zigzag => "zigzag",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatrolState {
    pub mode: PatrolMode,
    pub waypoints: Vec<GeoPoint>,
    pub current_index: usize,
}

impl PatrolState {
    pub fn current_waypoint(&self) -> Option<GeoPoint> {
        if self.mode == PatrolMode::None {
            return None;
        }
        self.waypoints.get(self.current_index).copied()
    }

    pub(crate) fn advance(&mut self) {
        if self.waypoints.is_empty() {
            self.current_index = 0;
        } else {
            self.current_index = (self.current_index + 1) % self.waypoints.len();
        }
    }
}

/// Builds the fixed waypoint list for `mode` around `center`.
pub fn generate_waypoints<R: Rng + ?Sized>(
    mode: PatrolMode,
    center: GeoPoint,
    rng: &mut R,
) -> Vec<GeoPoint> {
    match mode {
        PatrolMode::None => Vec::new(),
        PatrolMode::Circle => (0..CIRCLE_WAYPOINTS)
            .map(|i| {
                let angle = TAU * i as f64 / CIRCLE_WAYPOINTS as f64;
                center.offset(
                    CIRCLE_RADIUS_LNG_DEG * angle.cos(),
                    CIRCLE_RADIUS_LAT_DEG * angle.sin(),
                )
            })
            .collect(),
        PatrolMode::Figure8 => (0..FIGURE8_WAYPOINTS)
            .map(|i| {
                // Lemniscate of Bernoulli, parametrized by t.
                let t = TAU * i as f64 / FIGURE8_WAYPOINTS as f64;
                let denom = 1.0 + t.sin().powi(2);
                center.offset(
                    FIGURE8_SCALE_DEG * t.cos() / denom,
                    FIGURE8_SCALE_DEG * t.sin() * t.cos() / denom,
                )
            })
            .collect(),
        PatrolMode::Random => (0..RANDOM_WAYPOINTS)
            .map(|_| {
                GeoPoint::new(
                    rng.gen_range(-180.0..=180.0),
                    rng.gen_range(-RANDOM_MAX_LAT_DEG..=RANDOM_MAX_LAT_DEG),
                )
            })
            .collect(),
        PatrolMode::Zigzag => {
            let step = ZIGZAG_SWEEP_DEG / (ZIGZAG_WAYPOINTS - 1) as f64;
            (0..ZIGZAG_WAYPOINTS)
                .map(|i| {
                    let d_lng = -ZIGZAG_SWEEP_DEG / 2.0 + step * i as f64;
                    let d_lat = if i % 2 == 0 {
                        ZIGZAG_AMPLITUDE_DEG
                    } else {
                        -ZIGZAG_AMPLITUDE_DEG
                    };
                    center.offset(d_lng, d_lat)
                })
                .collect()
        }
    }
}
