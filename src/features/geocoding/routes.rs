use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::geocoding::handlers::search_address;
use crate::modules::geocoding::Geocoder;

/// Create routes for address search
pub fn routes(geocoder: Arc<dyn Geocoder>) -> Router {
    Router::new()
        .route("/api/geocode/search", get(search_address))
        .with_state(geocoder)
}
