use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Export format of a generated report, matching the database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_format", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportFormat {
    Pdf,
    Csv,
    Xlsx,
}

impl ReportFormat {
    /// Exact, case-sensitive match on the wire value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PDF" => Some(ReportFormat::Pdf),
            "CSV" => Some(ReportFormat::Csv),
            "XLSX" => Some(ReportFormat::Xlsx),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Pdf => write!(f, "PDF"),
            ReportFormat::Csv => write!(f, "CSV"),
            ReportFormat::Xlsx => write!(f, "XLSX"),
        }
    }
}

/// Row of the `reports` table
#[derive(Debug, Clone, FromRow)]
pub struct GeneratedReport {
    pub report_id: i64,
    pub generator_id: Uuid,
    pub report_name: String,
    pub format: ReportFormat,
    pub category: Option<String>,
    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new report record; the generator comes from the session
#[derive(Debug, Clone, PartialEq)]
pub struct NewGeneratedReport {
    pub report_name: String,
    pub format: ReportFormat,
    pub category: Option<String>,
    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,
}
