use serde::Serialize;

use crate::geo::GeoPoint;
use crate::uxv::{PatrolMode, WeaponType};

/// Effect requested by a terminal command, consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    FlyTo {
        center: GeoPoint,
        zoom: Option<f64>,
        duration_ms: Option<u64>,
    },
    Zoom {
        zoom: f64,
        duration_ms: Option<u64>,
    },
    StartUxv {
        position: Option<GeoPoint>,
    },
    StopUxv,
    UxvGoto {
        target: GeoPoint,
    },
    UxvSpeed {
        meters_per_second: f64,
    },
    UxvDrop,
    UxvReturn,
    UxvFollow {
        enabled: bool,
    },
    UxvWeapon {
        weapon: WeaponType,
    },
    UxvPatrol {
        mode: PatrolMode,
    },
    UxvAltitude {
        meters: f64,
    },
    UxvCharge {
        active: bool,
    },
    UxvFire {
        target: Option<GeoPoint>,
    },
    UxvTrail {
        max_length: usize,
    },
    PlaySound {
        id: String,
    },
    UnlockAchievement {
        id: String,
    },
    TriggerAlert {
        duration_ms: Option<u64>,
    },
}

impl Action {
    pub fn play_sound(id: impl Into<String>) -> Self {
        Self::PlaySound { id: id.into() }
    }

    pub fn unlock(id: impl Into<String>) -> Self {
        Self::UnlockAchievement { id: id.into() }
    }

    pub fn fly_to(center: GeoPoint, zoom: Option<f64>) -> Self {
        Self::FlyTo {
            center,
            zoom,
            duration_ms: None,
        }
    }

    /// Stable name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FlyTo { .. } => "fly_to",
            Self::Zoom { .. } => "zoom",
            Self::StartUxv { .. } => "start_uxv",
            Self::StopUxv => "stop_uxv",
            Self::UxvGoto { .. } => "uxv_goto",
            Self::UxvSpeed { .. } => "uxv_speed",
            Self::UxvDrop => "uxv_drop",
            Self::UxvReturn => "uxv_return",
            Self::UxvFollow { .. } => "uxv_follow",
            Self::UxvWeapon { .. } => "uxv_weapon",
            Self::UxvPatrol { .. } => "uxv_patrol",
            Self::UxvAltitude { .. } => "uxv_altitude",
            Self::UxvCharge { .. } => "uxv_charge",
            Self::UxvFire { .. } => "uxv_fire",
            Self::UxvTrail { .. } => "uxv_trail",
            Self::PlaySound { .. } => "play_sound",
            Self::UnlockAchievement { .. } => "unlock_achievement",
            Self::TriggerAlert { .. } => "trigger_alert",
        }
    }
}
