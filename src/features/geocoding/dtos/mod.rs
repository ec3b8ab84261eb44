use serde::Deserialize;
use utoipa::IntoParams;

/// Query params for address search
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct GeocodeQueryParams {
    /// Free-form address, e.g. "Rizal Park, Manila"
    #[serde(default)]
    pub q: String,
}
