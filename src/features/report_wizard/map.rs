use super::draft::Coordinates;

/// Zoom of the primary map before anything is known
pub const DEFAULT_ZOOM: u8 = 12;
/// Zoom after an address search hit
pub const SEARCH_ZOOM: u8 = 15;
/// Zoom after a device fix
pub const DEVICE_ZOOM: u8 = 16;
/// Zoom of the review map
pub const REVIEW_ZOOM: u8 = 13;

/// The operations the wizard needs from an interactive map widget
pub trait MapView {
    /// Centre the view. `None` keeps the current zoom.
    fn set_view(&mut self, center: Coordinates, zoom: Option<u8>);
    fn set_marker(&mut self, at: Coordinates);
    /// Recompute layout after the container became visible or resized
    fn invalidate_size(&mut self);
}

/// Creates map widgets on demand
pub trait MapProvider {
    type Map: MapView;

    fn create(&mut self, center: Coordinates, zoom: u8) -> Self::Map;
}

/// Map that ignores every call, for headless use
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMap;

impl MapView for NoopMap {
    fn set_view(&mut self, _center: Coordinates, _zoom: Option<u8>) {}
    fn set_marker(&mut self, _at: Coordinates) {}
    fn invalidate_size(&mut self) {}
}

impl MapProvider for NoopMap {
    type Map = NoopMap;

    fn create(&mut self, _center: Coordinates, _zoom: u8) -> NoopMap {
        NoopMap
    }
}
