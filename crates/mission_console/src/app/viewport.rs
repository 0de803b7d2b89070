use std::f64::consts::PI;

use mission_core::{FlyToRequest, GeoPoint, MapViewport, ScreenPoint};
use tracing::debug;

const TILE_SIZE_PX: f64 = 512.0;
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;
const MIN_ZOOM: f64 = 0.0;
const MAX_ZOOM: f64 = 22.0;

/// Camera without a renderer: tracks center and zoom, projects with Web
/// Mercator, and logs every move.
#[derive(Debug, Clone)]
pub(crate) struct HeadlessViewport {
    center: GeoPoint,
    zoom: f64,
    width_px: f64,
    height_px: f64,
}

impl Default for HeadlessViewport {
    fn default() -> Self {
        Self::new(GeoPoint::new(0.0, 20.0), 2.0, 1280.0, 720.0)
    }
}

impl HeadlessViewport {
    pub(crate) fn new(center: GeoPoint, zoom: f64, width_px: f64, height_px: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width_px,
            height_px,
        }
    }

    pub(crate) fn zoom(&self) -> f64 {
        self.zoom
    }

    fn world_px(&self, point: GeoPoint) -> (f64, f64) {
        let world_size = TILE_SIZE_PX * 2f64.powf(self.zoom);
        let lat = point.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
        let x = (point.lng + 180.0) / 360.0 * world_size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world_size;
        (x, y)
    }
}

impl MapViewport for HeadlessViewport {
    fn project(&self, point: GeoPoint) -> ScreenPoint {
        let (x, y) = self.world_px(point);
        let (cx, cy) = self.world_px(self.center);
        ScreenPoint {
            x: x - cx + self.width_px / 2.0,
            y: y - cy + self.height_px / 2.0,
        }
    }

    fn fly_to(&mut self, request: FlyToRequest) {
        self.center = request.center;
        if let Some(zoom) = request.zoom {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
        debug!(
            lng = request.center.lng,
            lat = request.center.lat,
            zoom = self.zoom,
            duration_ms = request.duration_ms,
            "camera_fly_to"
        );
    }

    fn zoom_to(&mut self, zoom: f64, duration_ms: Option<u64>) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        debug!(zoom = self.zoom, duration_ms, "camera_zoom");
    }

    fn center(&self) -> GeoPoint {
        self.center
    }

    fn recenter(&mut self, center: GeoPoint) {
        self.center = center;
    }
}
