use crate::geo::{GeoPoint, ScreenPoint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyToRequest {
    pub center: GeoPoint,
    pub zoom: Option<f64>,
    pub duration_ms: Option<u64>,
}

/// Camera surface of the external map. Implementations must not block: camera
/// moves are requests, applied by the host on its own schedule.
pub trait MapViewport {
    fn project(&self, point: GeoPoint) -> ScreenPoint;

    fn fly_to(&mut self, request: FlyToRequest);

    fn zoom_to(&mut self, zoom: f64, duration_ms: Option<u64>);

    fn center(&self) -> GeoPoint;

    /// Best-effort recenter used by camera follow; keeps the current zoom.
    fn recenter(&mut self, center: GeoPoint) {
        self.fly_to(FlyToRequest {
            center,
            zoom: None,
            duration_ms: Some(0),
        });
    }
}
