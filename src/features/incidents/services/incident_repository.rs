use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::Result;
use crate::features::incidents::models::{
    CreateEvidence, CreateIncident, CreateLocation, Evidence, Incident,
};

pub(crate) const INCIDENT_COLUMNS: &str = r#"
    incident_id, reporter_id, location_id, incident_type, severity, status,
    description, observed_impacts, landmark, observed_date, observed_time,
    reporter_name, reporter_email, reporter_phone, source, created_at, updated_at
"#;

/// Persistence for submitted incidents
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// Insert the location and the incident referencing it, atomically
    async fn create_incident(
        &self,
        location: &CreateLocation,
        incident: &CreateIncident,
    ) -> Result<Incident>;

    async fn create_evidence(&self, evidence: &CreateEvidence) -> Result<Evidence>;
}

pub struct PgIncidentRepository {
    pool: PgPool,
}

impl PgIncidentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IncidentRepository for PgIncidentRepository {
    async fn create_incident(
        &self,
        location: &CreateLocation,
        incident: &CreateIncident,
    ) -> Result<Incident> {
        // Any early return drops `tx`, which rolls the location insert back
        let mut tx = self.pool.begin().await?;

        let location_id: uuid::Uuid = sqlx::query_scalar(
            "INSERT INTO locations (latitude, longitude) VALUES ($1, $2) RETURNING location_id",
        )
        .bind(location.latitude)
        .bind(location.longitude)
        .fetch_one(&mut *tx)
        .await?;

        let created = sqlx::query_as::<_, Incident>(&format!(
            r#"
            INSERT INTO incidents (
                incident_id, reporter_id, location_id, incident_type, severity,
                description, observed_impacts, landmark, observed_date, observed_time,
                reporter_name, reporter_email, reporter_phone, source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {INCIDENT_COLUMNS}
            "#
        ))
        .bind(&incident.incident_id)
        .bind(incident.reporter_id)
        .bind(location_id)
        .bind(&incident.incident_type)
        .bind(incident.severity)
        .bind(&incident.description)
        .bind(&incident.observed_impacts)
        .bind(&incident.landmark)
        .bind(incident.observed_date)
        .bind(incident.observed_time)
        .bind(&incident.reporter_name)
        .bind(&incident.reporter_email)
        .bind(&incident.reporter_phone)
        .bind(incident.source)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn create_evidence(&self, evidence: &CreateEvidence) -> Result<Evidence> {
        let created = sqlx::query_as::<_, Evidence>(
            r#"
            INSERT INTO evidence (
                incident_id, file_type, file_url, description, original_filename, file_size
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING evidence_id, incident_id, file_type, file_url, description,
                      original_filename, file_size, created_at
            "#,
        )
        .bind(&evidence.incident_id)
        .bind(&evidence.file_type)
        .bind(&evidence.file_url)
        .bind(&evidence.description)
        .bind(&evidence.original_filename)
        .bind(evidence.file_size)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory repository for pipeline and handler tests

    use super::*;
    use crate::core::error::AppError;
    use crate::features::incidents::models::{IncidentStatus, Location};
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct InMemoryIncidentRepository {
        pub locations: Mutex<Vec<Location>>,
        pub incidents: Mutex<Vec<Incident>>,
        pub evidence: Mutex<Vec<Evidence>>,
        /// Fail every incident insert, as a broken transaction would
        pub fail_incidents: bool,
        /// Fail evidence inserts whose original file name matches
        pub fail_evidence_named: Option<String>,
    }

    impl InMemoryIncidentRepository {
        pub fn failing() -> Self {
            Self {
                fail_incidents: true,
                ..Default::default()
            }
        }

        pub fn incident_count(&self) -> usize {
            self.incidents.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl IncidentRepository for InMemoryIncidentRepository {
        async fn create_incident(
            &self,
            location: &CreateLocation,
            incident: &CreateIncident,
        ) -> Result<Incident> {
            if self.fail_incidents {
                return Err(AppError::Database(sqlx::Error::PoolTimedOut));
            }

            let now = Utc::now();
            let location = Location {
                location_id: Uuid::new_v4(),
                latitude: location.latitude,
                longitude: location.longitude,
                created_at: now,
            };
            let created = Incident {
                incident_id: incident.incident_id.clone(),
                reporter_id: incident.reporter_id,
                location_id: location.location_id,
                incident_type: incident.incident_type.clone(),
                severity: incident.severity,
                status: IncidentStatus::New,
                description: incident.description.clone(),
                observed_impacts: incident.observed_impacts.clone(),
                landmark: incident.landmark.clone(),
                observed_date: incident.observed_date,
                observed_time: incident.observed_time,
                reporter_name: incident.reporter_name.clone(),
                reporter_email: incident.reporter_email.clone(),
                reporter_phone: incident.reporter_phone.clone(),
                source: incident.source,
                created_at: now,
                updated_at: now,
            };

            self.locations.lock().unwrap().push(location);
            self.incidents.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn create_evidence(&self, evidence: &CreateEvidence) -> Result<Evidence> {
            if self.fail_evidence_named.as_deref() == Some(evidence.original_filename.as_str()) {
                return Err(AppError::Database(sqlx::Error::RowNotFound));
            }

            let created = Evidence {
                evidence_id: Uuid::new_v4(),
                incident_id: evidence.incident_id.clone(),
                file_type: evidence.file_type.clone(),
                file_url: evidence.file_url.clone(),
                description: evidence.description.clone(),
                original_filename: evidence.original_filename.clone(),
                file_size: evidence.file_size,
                created_at: Utc::now(),
            };
            self.evidence.lock().unwrap().push(created.clone());
            Ok(created)
        }
    }
}
