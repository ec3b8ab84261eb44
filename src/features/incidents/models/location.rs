use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for an incident location
#[derive(Debug, Clone, FromRow)]
pub struct Location {
    pub location_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new location
#[derive(Debug, Clone)]
pub struct CreateLocation {
    pub latitude: f64,
    pub longitude: f64,
}
