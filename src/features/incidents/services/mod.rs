pub mod content_type;
pub mod evidence_service;
pub mod incident_repository;
pub mod submission_form;
pub mod submission_service;
pub mod validation;

pub use evidence_service::{EvidenceService, IngestReport, StoredEvidence};
pub use incident_repository::{IncidentRepository, PgIncidentRepository};
pub use submission_form::{SubmissionForm, UploadBody, UploadedFile};
pub use submission_service::{SubmissionOutcome, SubmissionService};
pub use validation::FieldErrors;
