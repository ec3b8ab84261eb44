use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Incident status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "incident_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    New,
    InReview,
    Resolved,
    Closed,
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncidentStatus::New => write!(f, "new"),
            IncidentStatus::InReview => write!(f, "in_review"),
            IncidentStatus::Resolved => write!(f, "resolved"),
            IncidentStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Incident severity enum matching database enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "incident_severity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IncidentSeverity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl IncidentSeverity {
    /// Parse the value of a severity form field, case-insensitively.
    /// Returns `None` for anything outside the known set, including "".
    pub fn from_form(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(IncidentSeverity::Low),
            "medium" => Some(IncidentSeverity::Medium),
            "high" => Some(IncidentSeverity::High),
            "critical" => Some(IncidentSeverity::Critical),
            _ => None,
        }
    }

    /// Label used in form posts and review summaries
    pub fn label(&self) -> &'static str {
        match self {
            IncidentSeverity::Low => "Low",
            IncidentSeverity::Medium => "Medium",
            IncidentSeverity::High => "High",
            IncidentSeverity::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for IncidentSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncidentSeverity::Low => write!(f, "low"),
            IncidentSeverity::Medium => write!(f, "medium"),
            IncidentSeverity::High => write!(f, "high"),
            IncidentSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Which submission flow produced the incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "incident_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IncidentSource {
    Guided,
    Quick,
}

impl IncidentSource {
    /// Prefix for stored evidence file names
    pub fn file_prefix(&self) -> &'static str {
        match self {
            IncidentSource::Guided => "guided",
            IncidentSource::Quick => "quick",
        }
    }
}

/// Database model for incidents
#[derive(Debug, Clone, FromRow)]
pub struct Incident {
    pub incident_id: String,
    pub reporter_id: Option<Uuid>,
    pub location_id: Uuid,
    pub incident_type: String,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    pub description: String,
    pub observed_impacts: Vec<String>,
    pub landmark: Option<String>,
    pub observed_date: Option<NaiveDate>,
    pub observed_time: Option<NaiveTime>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub source: IncidentSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new incident. The location is created alongside it.
#[derive(Debug, Clone)]
pub struct CreateIncident {
    pub incident_id: String,
    pub reporter_id: Option<Uuid>,
    pub incident_type: String,
    pub severity: IncidentSeverity,
    pub description: String,
    pub observed_impacts: Vec<String>,
    pub landmark: Option<String>,
    pub observed_date: Option<NaiveDate>,
    pub observed_time: Option<NaiveTime>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub source: IncidentSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_form() {
        assert_eq!(IncidentSeverity::from_form("High"), Some(IncidentSeverity::High));
        assert_eq!(IncidentSeverity::from_form(" critical "), Some(IncidentSeverity::Critical));
        assert_eq!(IncidentSeverity::from_form(""), None);
        assert_eq!(IncidentSeverity::from_form("severe"), None);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&IncidentStatus::InReview).unwrap();
        assert_eq!(json, "\"in_review\"");
        assert_eq!(IncidentStatus::InReview.to_string(), "in_review");
    }
}
