use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::features::incidents::services::SubmissionOutcome;

pub const GUIDED_SUCCESS_MESSAGE: &str = "Guided report submitted successfully!";
pub const QUICK_SUCCESS_MESSAGE: &str = "Report submitted successfully!";
pub const PARTIAL_SUCCESS_MESSAGE: &str = "Report submitted, but some files failed to upload.";
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed. Fix the highlighted fields.";

/// Multipart form for the guided wizard submission
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct GuidedReportForm {
    #[schema(example = "pollution")]
    pub category: String,
    #[schema(example = "14.599500")]
    pub latitude: String,
    #[schema(example = "120.984200")]
    pub longitude: String,
    pub landmark: Option<String>,
    /// Repeated field `impacts[]`
    #[schema(rename = "impacts[]")]
    pub impacts: Option<Vec<String>>,
    #[schema(rename = "otherImpacts")]
    pub other_impacts: Option<String>,
    /// Up to 1000 characters
    pub details: String,
    #[schema(example = "High")]
    pub severity: Option<String>,
    #[schema(example = "2024-03-05")]
    pub date: Option<String>,
    #[schema(example = "08:30")]
    pub time: Option<String>,
    pub fullname: String,
    pub email: String,
    pub phone: Option<String>,
    /// Repeated file field `evidence[]`
    #[schema(rename = "evidence[]", format = Binary, content_media_type = "application/octet-stream")]
    pub evidence: Option<Vec<String>>,
}

/// Multipart form for the quick report submission
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct QuickReportForm {
    pub description: Option<String>,
    #[schema(example = "waste")]
    pub category: String,
    pub latitude: String,
    pub longitude: String,
    /// Repeated file field `evidence[]`
    #[schema(rename = "evidence[]", format = Binary, content_media_type = "application/octet-stream")]
    pub evidence: Option<Vec<String>>,
}

/// Response of the guided submission endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GuidedSubmissionResponse {
    pub success: bool,
    pub message: String,
    /// Field or `file_{i}` -> message
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "GR-20240305-1A2B3C4D")]
    pub report_id: Option<String>,
    /// Stored names of the accepted evidence files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

impl From<SubmissionOutcome> for GuidedSubmissionResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Rejected { errors } => Self {
                success: false,
                message: VALIDATION_FAILED_MESSAGE.to_string(),
                errors,
                report_id: None,
                files: None,
            },
            SubmissionOutcome::Accepted { incident_id, files } => Self {
                success: true,
                message: GUIDED_SUCCESS_MESSAGE.to_string(),
                errors: BTreeMap::new(),
                report_id: Some(incident_id),
                files: Some(files),
            },
            SubmissionOutcome::PartiallyAccepted {
                incident_id,
                files,
                file_errors,
            } => Self {
                success: true,
                message: PARTIAL_SUCCESS_MESSAGE.to_string(),
                errors: file_errors,
                report_id: Some(incident_id),
                files: Some(files),
            },
        }
    }
}

/// Response of the quick submission endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuickSubmissionResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "INC-20240305-1A2B3C4D")]
    pub incident_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

impl From<SubmissionOutcome> for QuickSubmissionResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Rejected { errors } => Self {
                success: false,
                message: VALIDATION_FAILED_MESSAGE.to_string(),
                incident_id: None,
                errors,
            },
            SubmissionOutcome::Accepted { incident_id, .. } => Self {
                success: true,
                message: QUICK_SUCCESS_MESSAGE.to_string(),
                incident_id: Some(incident_id),
                errors: BTreeMap::new(),
            },
            SubmissionOutcome::PartiallyAccepted {
                incident_id,
                file_errors,
                ..
            } => Self {
                success: true,
                message: PARTIAL_SUCCESS_MESSAGE.to_string(),
                incident_id: Some(incident_id),
                errors: file_errors,
            },
        }
    }
}
