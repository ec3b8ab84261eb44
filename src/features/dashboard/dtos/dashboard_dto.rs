use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::models::{UserRole, UserStatus};
use crate::features::dashboard::models::{GeneratedReport, NewGeneratedReport, ReportFormat};
use crate::features::incidents::models::{IncidentSeverity, IncidentSource, IncidentStatus};
use crate::shared::validation::sanitize_text;

const REPORT_NAME_MAX_CHARS: usize = 255;
const REPORT_CATEGORY_MAX_CHARS: usize = 64;

// ============================================================================
// Incident DTOs
// ============================================================================

/// Row shape of the incident listing query
#[derive(Debug, Clone, FromRow)]
pub struct IncidentListRow {
    pub incident_id: String,
    pub incident_type: String,
    pub landmark: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    pub source: IncidentSource,
    pub created_at: DateTime<Utc>,
}

/// Incident as listed on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardIncidentDto {
    #[schema(example = "GR-20240305-1A2B3C4D")]
    pub id: String,
    #[serde(rename = "type")]
    #[schema(example = "pollution")]
    pub incident_type: String,
    /// Landmark when one was given, otherwise "lat, lng"
    pub location: String,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    pub source: IncidentSource,
    pub date: DateTime<Utc>,
}

impl From<IncidentListRow> for DashboardIncidentDto {
    fn from(row: IncidentListRow) -> Self {
        let location = match row.landmark.as_deref().map(str::trim) {
            Some(landmark) if !landmark.is_empty() => landmark.to_string(),
            _ => format!("{:.6}, {:.6}", row.latitude, row.longitude),
        };

        Self {
            id: row.incident_id,
            incident_type: row.incident_type,
            location,
            severity: row.severity,
            status: row.status,
            source: row.source,
            date: row.created_at,
        }
    }
}

/// Request body for changing an incident's status
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateIncidentStatusDto {
    pub status: IncidentStatus,
}

// ============================================================================
// User DTOs
// ============================================================================

/// Row shape of the user listing query
#[derive(Debug, Clone, FromRow)]
pub struct UserListRow {
    pub user_code: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// User account as listed on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardUserDto {
    #[schema(example = "USR-1A2B3C4D")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub last_login: Option<DateTime<Utc>>,
    pub status: UserStatus,
}

impl From<UserListRow> for DashboardUserDto {
    fn from(row: UserListRow) -> Self {
        Self {
            id: row.user_code,
            name: row.full_name,
            email: row.email,
            role: row.role,
            last_login: row.last_login_at,
            status: row.status,
        }
    }
}

// ============================================================================
// Generated report DTOs
// ============================================================================

/// Request body for recording a generated report.
/// Empty optional fields are treated as absent.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateGeneratedReportDto {
    #[serde(default)]
    #[schema(example = "Q1 water incidents")]
    pub report_name: String,
    /// One of PDF, CSV, XLSX
    #[serde(default)]
    #[schema(example = "PDF")]
    pub format: String,
    #[schema(example = "water")]
    pub report_category: Option<String>,
    /// YYYY-MM-DD
    #[schema(example = "2024-01-01")]
    pub date_start: Option<String>,
    /// YYYY-MM-DD
    #[schema(example = "2024-03-31")]
    pub date_end: Option<String>,
}

impl CreateGeneratedReportDto {
    /// Check the request and normalise it into a record to insert
    pub fn validate(&self) -> Result<NewGeneratedReport> {
        let report_name = sanitize_text(&self.report_name);
        let format = self.format.trim();
        if report_name.is_empty() || format.is_empty() {
            return Err(AppError::BadRequest(
                "Report Name and Format are required.".to_string(),
            ));
        }
        if report_name.chars().count() > REPORT_NAME_MAX_CHARS {
            return Err(AppError::BadRequest(format!(
                "Report Name must be at most {} characters.",
                REPORT_NAME_MAX_CHARS
            )));
        }

        let format = ReportFormat::parse(format)
            .ok_or_else(|| AppError::BadRequest("Invalid report format specified.".to_string()))?;

        let category = self
            .report_category
            .as_deref()
            .map(sanitize_text)
            .filter(|c| !c.is_empty());
        if category
            .as_ref()
            .is_some_and(|c| c.chars().count() > REPORT_CATEGORY_MAX_CHARS)
        {
            return Err(AppError::BadRequest(format!(
                "Report category must be at most {} characters.",
                REPORT_CATEGORY_MAX_CHARS
            )));
        }

        let date_range_start = parse_report_date(self.date_start.as_deref())?;
        let date_range_end = parse_report_date(self.date_end.as_deref())?;
        if let (Some(start), Some(end)) = (date_range_start, date_range_end) {
            if start > end {
                return Err(AppError::BadRequest(
                    "The start date must not be after the end date.".to_string(),
                ));
            }
        }

        Ok(NewGeneratedReport {
            report_name,
            format,
            category,
            date_range_start,
            date_range_end,
        })
    }
}

fn parse_report_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid date {:?}, expected YYYY-MM-DD.", v))),
    }
}

/// Recorded report as returned to the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeneratedReportDto {
    #[schema(example = 42)]
    pub report_id: i64,
    pub generator_id: Uuid,
    pub report_name: String,
    pub format: ReportFormat,
    pub category: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<GeneratedReport> for GeneratedReportDto {
    fn from(row: GeneratedReport) -> Self {
        Self {
            report_id: row.report_id,
            generator_id: row.generator_id,
            report_name: row.report_name,
            format: row.format,
            category: row.category,
            date_start: row.date_range_start,
            date_end: row.date_range_end,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_request() -> CreateGeneratedReportDto {
        CreateGeneratedReportDto {
            report_name: "Q1 water incidents".to_string(),
            format: "CSV".to_string(),
            ..Default::default()
        }
    }

    fn rejection(dto: CreateGeneratedReportDto) -> String {
        match dto.validate() {
            Err(AppError::BadRequest(msg)) => msg,
            other => panic!("expected a bad request, got {:?}", other),
        }
    }

    #[test]
    fn test_generated_report_requires_name_and_format() {
        let no_name = CreateGeneratedReportDto {
            report_name: "   ".to_string(),
            ..report_request()
        };
        assert_eq!(rejection(no_name), "Report Name and Format are required.");

        let no_format = CreateGeneratedReportDto {
            format: String::new(),
            ..report_request()
        };
        assert_eq!(rejection(no_format), "Report Name and Format are required.");
    }

    #[test]
    fn test_generated_report_format_is_exact() {
        for format in ["pdf", "DOCX", "Xlsx"] {
            let dto = CreateGeneratedReportDto {
                format: format.to_string(),
                ..report_request()
            };
            assert_eq!(rejection(dto), "Invalid report format specified.");
        }

        let dto = CreateGeneratedReportDto {
            format: " XLSX ".to_string(),
            ..report_request()
        };
        assert_eq!(dto.validate().unwrap().format, ReportFormat::Xlsx);
    }

    #[test]
    fn test_generated_report_empty_optionals_become_none() {
        let dto = CreateGeneratedReportDto {
            report_category: Some("  ".to_string()),
            date_start: Some(String::new()),
            date_end: None,
            ..report_request()
        };

        let report = dto.validate().unwrap();
        assert_eq!(report.category, None);
        assert_eq!(report.date_range_start, None);
        assert_eq!(report.date_range_end, None);
    }

    #[test]
    fn test_generated_report_dates() {
        let dto = CreateGeneratedReportDto {
            report_category: Some("water".to_string()),
            date_start: Some("2024-01-01".to_string()),
            date_end: Some("2024-03-31".to_string()),
            ..report_request()
        };
        let report = dto.validate().unwrap();
        assert_eq!(report.category.as_deref(), Some("water"));
        assert_eq!(report.date_range_start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(report.date_range_end, NaiveDate::from_ymd_opt(2024, 3, 31));

        let reversed = CreateGeneratedReportDto {
            date_start: Some("2024-04-01".to_string()),
            date_end: Some("2024-03-31".to_string()),
            ..report_request()
        };
        assert_eq!(
            rejection(reversed),
            "The start date must not be after the end date."
        );

        let malformed = CreateGeneratedReportDto {
            date_end: Some("31/03/2024".to_string()),
            ..report_request()
        };
        assert!(rejection(malformed).contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_generated_report_name_is_sanitized_and_bounded() {
        let dto = CreateGeneratedReportDto {
            report_name: "<b>Spills</b>".to_string(),
            ..report_request()
        };
        assert_eq!(dto.validate().unwrap().report_name, "&lt;b&gt;Spills&lt;/b&gt;");

        let dto = CreateGeneratedReportDto {
            report_name: "&".repeat(60),
            ..report_request()
        };
        assert!(rejection(dto).contains("255"));
    }

    #[test]
    fn test_generated_report_serializes_format_uppercase() {
        let json = serde_json::to_value(GeneratedReportDto {
            report_id: 7,
            generator_id: Uuid::nil(),
            report_name: "Monthly".to_string(),
            format: ReportFormat::Pdf,
            category: None,
            date_start: NaiveDate::from_ymd_opt(2024, 1, 1),
            date_end: None,
            created_at: Utc::now(),
        })
        .unwrap();

        assert_eq!(json["format"], "PDF");
        assert_eq!(json["date_start"], "2024-01-01");
    }

    fn row(landmark: Option<&str>) -> IncidentListRow {
        IncidentListRow {
            incident_id: "INC-20240305-1A2B3C4D".to_string(),
            incident_type: "waste".to_string(),
            landmark: landmark.map(str::to_string),
            latitude: 14.5995,
            longitude: 120.9842,
            severity: IncidentSeverity::High,
            status: IncidentStatus::New,
            source: IncidentSource::Quick,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_location_prefers_landmark() {
        let dto = DashboardIncidentDto::from(row(Some("Market, Stall 4")));
        assert_eq!(dto.location, "Market, Stall 4");
    }

    #[test]
    fn test_location_falls_back_to_coordinates() {
        assert_eq!(DashboardIncidentDto::from(row(None)).location, "14.599500, 120.984200");
        assert_eq!(DashboardIncidentDto::from(row(Some("  "))).location, "14.599500, 120.984200");
    }

    #[test]
    fn test_incident_serializes_type_field() {
        let json = serde_json::to_value(DashboardIncidentDto::from(row(None))).unwrap();
        assert_eq!(json["type"], "waste");
        assert_eq!(json["severity"], "high");
        assert_eq!(json["status"], "new");
    }
}
