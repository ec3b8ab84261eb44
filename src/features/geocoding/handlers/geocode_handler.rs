use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::geocoding::dtos::GeocodeQueryParams;
use crate::modules::geocoding::{GeocodeMatch, Geocoder};
use crate::shared::types::ApiResponse;

const MAX_QUERY_CHARS: usize = 200;

/// Resolve an address to coordinates
///
/// Proxies the configured Nominatim service so requests carry the server's
/// user agent.
#[utoipa::path(
    get,
    path = "/api/geocode/search",
    tag = "geocoding",
    params(GeocodeQueryParams),
    responses(
        (status = 200, description = "First match", body = ApiResponse<GeocodeMatch>),
        (status = 400, description = "Empty query"),
        (status = 404, description = "Location not found"),
        (status = 502, description = "Geocoding service unavailable")
    )
)]
pub async fn search_address(
    State(geocoder): State<Arc<dyn Geocoder>>,
    Query(params): Query<GeocodeQueryParams>,
) -> Result<Json<ApiResponse<GeocodeMatch>>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("Enter an address to search.".to_string()));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::BadRequest(format!(
            "Address must be at most {} characters.",
            MAX_QUERY_CHARS
        )));
    }

    let found = geocoder
        .search(query)
        .await?
        .ok_or_else(|| AppError::NotFound("Location not found.".to_string()))?;

    Ok(Json(ApiResponse::success(Some(found), None, None)))
}
