use std::collections::HashMap;

use serde::Deserialize;

use crate::geo::{BoundingBox, GeoPoint};

pub const DEFAULT_GEOFENCE_ZOOM: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Geofence {
    pub key: String,
    pub bbox: BoundingBox,
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(default)]
    pub zoom: Option<f64>,
}

impl Geofence {
    pub fn center(&self) -> GeoPoint {
        self.bbox.center()
    }

    pub fn camera_zoom(&self) -> f64 {
        self.zoom.unwrap_or(DEFAULT_GEOFENCE_ZOOM)
    }
}

/// Immutable lookup table of named regions, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct GeofenceRegistry {
    fences: Vec<Geofence>,
    lookup_by_lower_key: HashMap<String, usize>,
}

impl GeofenceRegistry {
    /// Later duplicates of a key are ignored; `MissionConfig::validate` reports them.
    pub fn new(fences: Vec<Geofence>) -> Self {
        let mut registry = Self::default();
        for fence in fences {
            let lower = fence.key.to_ascii_lowercase();
            if registry.lookup_by_lower_key.contains_key(&lower) {
                continue;
            }
            registry.fences.push(fence);
            registry
                .lookup_by_lower_key
                .insert(lower, registry.fences.len() - 1);
        }
        registry
    }

    pub fn get(&self, key: &str) -> Option<&Geofence> {
        let index = self.lookup_by_lower_key.get(&key.to_ascii_lowercase())?;
        self.fences.get(*index)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fences.iter().map(|fence| fence.key.as_str())
    }

    pub fn containing(&self, point: GeoPoint) -> impl Iterator<Item = &Geofence> {
        self.fences
            .iter()
            .filter(move |fence| fence.bbox.contains(point))
    }

    pub fn len(&self) -> usize {
        self.fences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fences.is_empty()
    }
}
