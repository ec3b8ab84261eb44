use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::dashboard::dtos::{
    DashboardIncidentDto, DashboardUserDto, GeneratedReportDto, IncidentListRow, UserListRow,
};
use crate::features::dashboard::models::{GeneratedReport, NewGeneratedReport};
use crate::features::incidents::models::IncidentStatus;

const INCIDENT_LIST_SELECT: &str = r#"
    SELECT i.incident_id, i.incident_type, i.landmark, l.latitude, l.longitude,
           i.severity, i.status, i.source, i.created_at
    FROM incidents i
    JOIN locations l ON l.location_id = i.location_id
"#;

/// Service for the admin dashboard listings
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List incidents, newest first
    pub async fn list_incidents(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<DashboardIncidentDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM incidents")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count incidents: {:?}", e);
                AppError::Database(e)
            })?;

        let rows = sqlx::query_as::<_, IncidentListRow>(&format!(
            "{INCIDENT_LIST_SELECT} ORDER BY i.created_at DESC OFFSET $1 LIMIT $2"
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch incidents: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// List user accounts, newest first
    pub async fn list_users(&self, offset: i64, limit: i64) -> Result<(Vec<DashboardUserDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        let rows = sqlx::query_as::<_, UserListRow>(
            r#"
            SELECT user_code, full_name, email, role, status, last_login_at
            FROM users
            ORDER BY created_at DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch users: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Change the workflow status of one incident
    pub async fn update_incident_status(
        &self,
        incident_id: &str,
        status: IncidentStatus,
    ) -> Result<DashboardIncidentDto> {
        let updated = sqlx::query(
            "UPDATE incidents SET status = $2, updated_at = NOW() WHERE incident_id = $1",
        )
        .bind(incident_id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Incident {} not found", incident_id)));
        }

        let row = sqlx::query_as::<_, IncidentListRow>(&format!(
            "{INCIDENT_LIST_SELECT} WHERE i.incident_id = $1"
        ))
        .bind(incident_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Incident {} moved to {}", incident_id, status);
        Ok(row.into())
    }

    /// Record a report generated by `generator_id`
    pub async fn create_generated_report(
        &self,
        generator_id: Uuid,
        data: NewGeneratedReport,
    ) -> Result<GeneratedReportDto> {
        let row = sqlx::query_as::<_, GeneratedReport>(
            r#"
            INSERT INTO reports (generator_id, report_name, format, category,
                                 date_range_start, date_range_end)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING report_id, generator_id, report_name, format, category,
                      date_range_start, date_range_end, created_at
            "#,
        )
        .bind(generator_id)
        .bind(&data.report_name)
        .bind(data.format)
        .bind(&data.category)
        .bind(data.date_range_start)
        .bind(data.date_range_end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert report record: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Report record {} ({}) created by {}",
            row.report_id,
            row.format,
            generator_id
        );
        Ok(row.into())
    }
}
