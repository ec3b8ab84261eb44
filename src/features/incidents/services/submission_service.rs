use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::evidence_service::{EvidenceService, IngestReport};
use super::incident_repository::IncidentRepository;
use super::submission_form::SubmissionForm;
use super::validation::{validate_guided, validate_quick, FieldErrors};
use crate::core::error::Result;
use crate::features::incidents::models::{
    CreateEvidence, CreateIncident, CreateLocation, IncidentSeverity, IncidentSource,
};
use crate::shared::constants::{GUIDED_INCIDENT_PREFIX, QUICK_INCIDENT_PREFIX};

/// How a submission ended
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Core fields invalid. Nothing was stored.
    Rejected { errors: FieldErrors },
    /// Incident stored, every file stored
    Accepted {
        incident_id: String,
        files: Vec<String>,
    },
    /// Incident stored, some files failed
    PartiallyAccepted {
        incident_id: String,
        files: Vec<String>,
        file_errors: FieldErrors,
    },
}

/// Runs both submission flows: validate, ingest files, persist
pub struct SubmissionService {
    repository: Arc<dyn IncidentRepository>,
    evidence: EvidenceService,
}

impl SubmissionService {
    pub fn new(repository: Arc<dyn IncidentRepository>, evidence: EvidenceService) -> Self {
        Self {
            repository,
            evidence,
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.evidence.max_file_size()
    }

    /// Generate a shareable incident id in format: {PREFIX}-YYYYMMDD-XXXXXXXX
    pub fn generate_incident_id(source: IncidentSource) -> String {
        let prefix = match source {
            IncidentSource::Guided => GUIDED_INCIDENT_PREFIX,
            IncidentSource::Quick => QUICK_INCIDENT_PREFIX,
        };
        let token = Uuid::new_v4().simple().to_string().to_uppercase();
        format!("{}-{}-{}", prefix, Utc::now().format("%Y%m%d"), &token[..8])
    }

    pub async fn submit_guided(
        &self,
        form: SubmissionForm,
        reporter_id: Option<Uuid>,
    ) -> Result<SubmissionOutcome> {
        let report = match validate_guided(&form) {
            Ok(report) => report,
            Err(errors) => return Ok(SubmissionOutcome::Rejected { errors }),
        };

        let location = CreateLocation {
            latitude: report.latitude,
            longitude: report.longitude,
        };
        let incident = CreateIncident {
            incident_id: Self::generate_incident_id(IncidentSource::Guided),
            reporter_id,
            incident_type: report.category,
            severity: report.severity,
            description: report.details,
            observed_impacts: report.impacts,
            landmark: report.landmark,
            observed_date: report.observed_date,
            observed_time: report.observed_time,
            reporter_name: Some(report.full_name),
            reporter_email: Some(report.email),
            reporter_phone: report.phone,
            source: IncidentSource::Guided,
        };

        self.persist(form, location, incident).await
    }

    pub async fn submit_quick(
        &self,
        form: SubmissionForm,
        reporter_id: Option<Uuid>,
    ) -> Result<SubmissionOutcome> {
        let report = match validate_quick(&form) {
            Ok(report) => report,
            Err(errors) => return Ok(SubmissionOutcome::Rejected { errors }),
        };

        let location = CreateLocation {
            latitude: report.latitude,
            longitude: report.longitude,
        };
        let incident = CreateIncident {
            incident_id: Self::generate_incident_id(IncidentSource::Quick),
            reporter_id,
            incident_type: report.category,
            severity: IncidentSeverity::Medium,
            description: report.description,
            observed_impacts: Vec::new(),
            landmark: None,
            observed_date: None,
            observed_time: None,
            reporter_name: None,
            reporter_email: None,
            reporter_phone: None,
            source: IncidentSource::Quick,
        };

        self.persist(form, location, incident).await
    }

    async fn persist(
        &self,
        form: SubmissionForm,
        location: CreateLocation,
        incident: CreateIncident,
    ) -> Result<SubmissionOutcome> {
        let source = incident.source;
        let IngestReport {
            stored,
            errors: mut file_errors,
        } = self.evidence.ingest(&form.files, source).await;

        let created = match self.repository.create_incident(&location, &incident).await {
            Ok(created) => created,
            Err(e) => {
                tracing::error!("Failed to persist incident {}: {}", incident.incident_id, e);
                self.evidence.discard(&stored).await;
                return Err(e);
            }
        };

        let mut files = Vec::with_capacity(stored.len());
        for evidence in &stored {
            let record = CreateEvidence {
                incident_id: created.incident_id.clone(),
                file_type: evidence.kind.label().to_string(),
                file_url: evidence.object.url.clone(),
                description: format!("Evidence file for {} report", source.file_prefix()),
                original_filename: evidence.original_name.clone(),
                file_size: evidence.object.size as i64,
            };

            match self.repository.create_evidence(&record).await {
                Ok(_) => files.push(evidence.object.name.clone()),
                Err(e) => {
                    tracing::error!(
                        "Failed to record evidence {} for {}: {}",
                        evidence.object.name,
                        created.incident_id,
                        e
                    );
                    self.evidence.discard_one(evidence).await;
                    file_errors.insert(
                        format!("file_{}", evidence.index),
                        format!("Failed to save file {}.", evidence.original_name),
                    );
                }
            }
        }

        tracing::info!(
            "Stored {} incident {} with {} file(s), {} file error(s)",
            source.file_prefix(),
            created.incident_id,
            files.len(),
            file_errors.len()
        );

        Ok(if file_errors.is_empty() {
            SubmissionOutcome::Accepted {
                incident_id: created.incident_id,
                files,
            }
        } else {
            SubmissionOutcome::PartiallyAccepted {
                incident_id: created.incident_id,
                files,
                file_errors,
            }
        })
    }
}
