use async_trait::async_trait;
use std::sync::Arc;

use super::draft::Coordinates;
use super::map::{MapView, DEFAULT_ZOOM, DEVICE_ZOOM, SEARCH_ZOOM};
use crate::modules::geocoding::Geocoder;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Please enter an address to search.")]
    EmptyQuery,

    #[error("Location not found.")]
    NotFound,

    #[error("Unable to retrieve your location.")]
    PermissionDenied,

    #[error("Geolocation not supported.")]
    Unavailable,

    #[error("Error searching location.")]
    Lookup(String),
}

/// Source of the device's own position
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Turns device fixes and address searches into coordinates
pub struct GeolocationResolver {
    geocoder: Arc<dyn Geocoder>,
    locator: Arc<dyn DeviceLocator>,
}

impl GeolocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, locator: Arc<dyn DeviceLocator>) -> Self {
        Self { geocoder, locator }
    }

    pub async fn locate_device(&self) -> Result<Coordinates, GeolocationError> {
        self.locator.current_position().await
    }

    /// Resolve an address. An empty query fails without a lookup.
    pub async fn search(&self, query: &str) -> Result<Coordinates, GeolocationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeolocationError::EmptyQuery);
        }

        let found = self
            .geocoder
            .search(query)
            .await
            .map_err(|e| GeolocationError::Lookup(e.to_string()))?
            .ok_or(GeolocationError::NotFound)?;

        Coordinates::new(found.lat, found.lng).ok_or(GeolocationError::NotFound)
    }
}

/// What produced a coordinate write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Device,
    Search,
    MapClick,
    /// Default centre used when no fix is available
    Fallback,
}

impl LocationSource {
    fn zoom(&self) -> Option<u8> {
        match self {
            LocationSource::Device => Some(DEVICE_ZOOM),
            LocationSource::Search => Some(SEARCH_ZOOM),
            LocationSource::MapClick => None,
            LocationSource::Fallback => Some(DEFAULT_ZOOM),
        }
    }
}

/// Issued when a lookup starts; records the write sequence at that moment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket {
    issued_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationWrite {
    pub version: u64,
    /// Another write landed while this lookup was pending and was replaced
    pub replaced_newer: bool,
}

/// The draft's coordinate slot
///
/// Writes replace the whole pair and bump a sequence number. The last write
/// to complete wins, whatever order the lookups started in.
#[derive(Debug, Clone, Default)]
pub struct LocationField {
    coordinates: Option<Coordinates>,
    version: u64,
}

impl LocationField {
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn begin_lookup(&self) -> LookupTicket {
        LookupTicket {
            issued_at: self.version,
        }
    }

    /// Apply the result of a lookup started with `ticket`
    pub fn apply<M: MapView>(
        &mut self,
        ticket: LookupTicket,
        at: Coordinates,
        source: LocationSource,
        map: &mut M,
    ) -> LocationWrite {
        let replaced_newer = self.version != ticket.issued_at;
        if replaced_newer {
            tracing::debug!(
                "Lookup from v{} overrides v{} at {}",
                ticket.issued_at,
                self.version,
                at
            );
        }
        self.write(at, source, map);
        LocationWrite {
            version: self.version,
            replaced_newer,
        }
    }

    /// A click on the primary map writes immediately
    pub fn set_from_map<M: MapView>(&mut self, at: Coordinates, map: &mut M) -> LocationWrite {
        self.write(at, LocationSource::MapClick, map);
        LocationWrite {
            version: self.version,
            replaced_newer: false,
        }
    }

    pub fn clear(&mut self) {
        self.coordinates = None;
        self.version += 1;
    }

    fn write<M: MapView>(&mut self, at: Coordinates, source: LocationSource, map: &mut M) {
        self.coordinates = Some(at);
        self.version += 1;
        map.set_view(at, source.zoom());
        map.set_marker(at);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FixedLocator;
    use super::*;
    use crate::core::error::{AppError, Result};
    use crate::features::report_wizard::map::testing::{MapEvent, RecordingMap};
    use crate::modules::geocoding::GeocodeMatch;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingGeocoder {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn search(&self, query: &str) -> Result<Option<GeocodeMatch>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::ExternalServiceError("down".to_string()));
            }
            Ok((query == "Manila").then(|| GeocodeMatch {
                lat: 14.5995,
                lng: 120.9842,
                display_name: "Manila".to_string(),
            }))
        }
    }

    fn point(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    fn resolver(geocoder: Arc<CountingGeocoder>) -> GeolocationResolver {
        GeolocationResolver::new(
            geocoder,
            Arc::new(FixedLocator(Err(GeolocationError::PermissionDenied))),
        )
    }

    #[tokio::test]
    async fn test_empty_query_makes_no_lookup() {
        let geocoder = Arc::new(CountingGeocoder::default());
        let resolver = resolver(geocoder.clone());

        assert_eq!(resolver.search("   ").await, Err(GeolocationError::EmptyQuery));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_hit_and_miss() {
        let geocoder = Arc::new(CountingGeocoder::default());
        let resolver = resolver(geocoder.clone());

        assert_eq!(resolver.search(" Manila ").await, Ok(point(14.5995, 120.9842)));
        assert_eq!(resolver.search("Atlantis").await, Err(GeolocationError::NotFound));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lookup_failures_map_to_errors() {
        let geocoder = Arc::new(CountingGeocoder {
            fail: true,
            ..Default::default()
        });
        let resolver = resolver(geocoder);

        assert!(matches!(
            resolver.search("Manila").await,
            Err(GeolocationError::Lookup(_))
        ));
        assert_eq!(
            resolver.locate_device().await,
            Err(GeolocationError::PermissionDenied)
        );
    }

    #[test]
    fn test_write_updates_map_with_source_zoom() {
        let mut field = LocationField::default();
        let mut map = RecordingMap::default();
        let at = point(10.0, 20.0);

        let ticket = field.begin_lookup();
        let write = field.apply(ticket, at, LocationSource::Search, &mut map);

        assert_eq!(field.coordinates(), Some(at));
        assert!(!write.replaced_newer);
        assert_eq!(
            map.events,
            vec![MapEvent::View(at, Some(SEARCH_ZOOM)), MapEvent::Marker(at)]
        );
    }

    #[test]
    fn test_late_lookup_wins_over_click_made_while_pending() {
        let mut field = LocationField::default();
        let mut map = RecordingMap::default();

        let ticket = field.begin_lookup();
        field.set_from_map(point(1.0, 1.0), &mut map);
        let write = field.apply(ticket, point(2.0, 2.0), LocationSource::Device, &mut map);

        assert!(write.replaced_newer);
        assert_eq!(field.coordinates(), Some(point(2.0, 2.0)));
        assert_eq!(map.last_marker(), Some(point(2.0, 2.0)));
    }

    #[test]
    fn test_overlapping_lookups_resolve_to_last_completed() {
        let mut field = LocationField::default();
        let mut map = RecordingMap::default();

        let first = field.begin_lookup();
        let second = field.begin_lookup();
        field.apply(second, point(5.0, 5.0), LocationSource::Search, &mut map);
        field.apply(first, point(6.0, 6.0), LocationSource::Device, &mut map);

        let c = field.coordinates().unwrap();
        assert_eq!((c.lat, c.lng), (6.0, 6.0));
        assert_eq!(field.version(), 2);
    }
}
