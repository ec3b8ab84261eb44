//! Address search against a Nominatim-compatible geocoding service

mod nominatim_client;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::core::error::Result;

pub use nominatim_client::{NominatimClient, NominatimResponse};

/// Best match for a free-form address query
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GeocodeMatch {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `query` to its first match, `None` when nothing matched
    async fn search(&self, query: &str) -> Result<Option<GeocodeMatch>>;
}
