use serde::{Deserialize, Serialize};

/// Meters per degree of latitude used by the flat-earth movement model.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    /// True when the point lies on the globe (`lng` in [-180,180], `lat` in [-90,90]).
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Euclidean distance in degrees, no great-circle correction.
    pub fn distance_deg(&self, other: GeoPoint) -> f64 {
        let dx = other.lng - self.lng;
        let dy = other.lat - self.lat;
        (dx * dx + dy * dy).sqrt()
    }

    /// Moves `step_deg` degrees along the straight line toward `target`, never overshooting.
    pub fn step_toward(&self, target: GeoPoint, step_deg: f64) -> GeoPoint {
        let distance = self.distance_deg(target);
        if distance <= step_deg || distance == 0.0 {
            return target;
        }
        let t = step_deg / distance;
        GeoPoint {
            lng: self.lng + (target.lng - self.lng) * t,
            lat: self.lat + (target.lat - self.lat) * t,
        }
    }

    pub fn offset(&self, d_lng: f64, d_lat: f64) -> GeoPoint {
        GeoPoint {
            lng: self.lng + d_lng,
            lat: self.lat + d_lat,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_lng..=self.max_lng).contains(&point.lng)
            && (self.min_lat..=self.max_lat).contains(&point.lat)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lng: (self.min_lng + self.max_lng) / 2.0,
            lat: (self.min_lat + self.max_lat) / 2.0,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        [self.min_lng, self.max_lng, self.min_lat, self.max_lat]
            .iter()
            .all(|value| value.is_finite())
            && self.min_lng <= self.max_lng
            && self.min_lat <= self.max_lat
    }
}
