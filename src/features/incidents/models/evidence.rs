use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for an evidence file attached to an incident
#[derive(Debug, Clone, FromRow)]
pub struct Evidence {
    pub evidence_id: Uuid,
    pub incident_id: String,
    /// Canonical type label, e.g. "JPG", "MOV", "PDF"
    pub file_type: String,
    /// Path relative to the server root, e.g. "uploads/guided_0191....jpg"
    pub file_url: String,
    pub description: String,
    pub original_filename: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new evidence record
#[derive(Debug, Clone)]
pub struct CreateEvidence {
    pub incident_id: String,
    pub file_type: String,
    pub file_url: String,
    pub description: String,
    pub original_filename: String,
    pub file_size: i64,
}
