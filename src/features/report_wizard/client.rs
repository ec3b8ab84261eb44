use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::evidence::{FileHandle, FileRef};
use super::machine::SubmissionPayload;
use super::quick::QuickPayload;
use crate::features::incidents::dtos::{GuidedSubmissionResponse, QuickSubmissionResponse};

pub const GUIDED_PATH: &str = "/api/reports/guided";
pub const QUICK_PATH: &str = "/api/reports/quick";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("A submission is already in progress.")]
    InFlight,

    /// Network failure, server failure or an unreadable body. Safe to retry.
    #[error("Network or server error while submitting.")]
    Transport(String),

    #[error("Could not read file {name}.")]
    UnreadableFile { name: String },

    /// The server answered with `success: false`
    #[error("{message}")]
    Rejected {
        message: String,
        errors: BTreeMap<String, String>,
    },
}

/// Clears the in-flight flag on every exit path
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Posts reports to the incident endpoints. At most one submission runs at a
/// time; never retries by itself.
pub struct SubmissionClient {
    client: reqwest::Client,
    base_url: String,
    in_flight: AtomicBool,
}

/// Responses carrying the shared `success`/`message`/`errors` fields
trait SubmissionReply: DeserializeOwned {
    fn outcome(self) -> Result<Self, SubmitError>;
}

impl SubmissionReply for GuidedSubmissionResponse {
    fn outcome(self) -> Result<Self, SubmitError> {
        if self.success {
            Ok(self)
        } else {
            Err(SubmitError::Rejected {
                message: self.message,
                errors: self.errors,
            })
        }
    }
}

impl SubmissionReply for QuickSubmissionResponse {
    fn outcome(self) -> Result<Self, SubmitError> {
        if self.success {
            Ok(self)
        } else {
            Err(SubmitError::Rejected {
                message: self.message,
                errors: self.errors,
            })
        }
    }
}

impl SubmissionClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn submit_guided(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<GuidedSubmissionResponse, SubmitError> {
        let _guard = self.acquire()?;

        let mut form = Form::new()
            .text("category", payload.category.as_str())
            .text("latitude", payload.coordinates.lat_field())
            .text("longitude", payload.coordinates.lng_field())
            .text("landmark", payload.landmark.clone());
        for impact in &payload.impacts {
            form = form.text("impacts[]", impact.clone());
        }
        form = form
            .text("otherImpacts", payload.other_impacts.clone())
            .text("details", payload.details.clone())
            .text("severity", payload.severity.label())
            .text(
                "date",
                payload
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            )
            .text(
                "time",
                payload
                    .time
                    .map(|t| t.format("%H:%M").to_string())
                    .unwrap_or_default(),
            )
            .text("fullname", payload.full_name.clone())
            .text("email", payload.email.clone())
            .text("phone", payload.phone.clone());
        let form = attach_files(form, &payload.files).await?;

        self.post(GUIDED_PATH, form).await
    }

    pub async fn submit_quick(
        &self,
        payload: &QuickPayload,
    ) -> Result<QuickSubmissionResponse, SubmitError> {
        let _guard = self.acquire()?;

        let form = Form::new()
            .text("description", payload.description.clone())
            .text("category", payload.category.as_str())
            .text("latitude", payload.coordinates.lat_field())
            .text("longitude", payload.coordinates.lng_field());
        let form = attach_files(form, &payload.files).await?;

        self.post(QUICK_PATH, form).await
    }

    fn acquire(&self) -> Result<InFlightGuard<'_>, SubmitError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SubmitError::InFlight)?;
        Ok(InFlightGuard(&self.in_flight))
    }

    async fn post<R: SubmissionReply>(&self, path: &str, form: Form) -> Result<R, SubmitError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Submission to {} failed: {}", url, e);
                SubmitError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status.is_server_error() {
            tracing::warn!("Submission to {} returned status {}", url, status);
            return Err(SubmitError::Transport(format!("Server returned status {}", status)));
        }

        let body: Value = response.json().await.map_err(|e| {
            tracing::warn!("Unreadable submission response from {}: {}", url, e);
            SubmitError::Transport(format!("Unreadable response: {}", e))
        })?;

        match serde_json::from_value::<R>(body.clone()) {
            Ok(reply) => reply.outcome(),
            Err(_) => Err(rejection_from_envelope(&body)
                .unwrap_or_else(|| SubmitError::Transport(format!("Unexpected response ({})", status)))),
        }
    }
}

/// Generic API error envelopes carry `success: false` and a message only
fn rejection_from_envelope(body: &Value) -> Option<SubmitError> {
    if body.get("success")?.as_bool()? {
        return None;
    }
    let message = body.get("message")?.as_str()?.to_string();
    Some(SubmitError::Rejected {
        message,
        errors: BTreeMap::new(),
    })
}

async fn attach_files(mut form: Form, files: &[FileRef]) -> Result<Form, SubmitError> {
    for file in files {
        let data = match &file.handle {
            FileHandle::Bytes(bytes) => bytes.clone(),
            FileHandle::Path(path) => tokio::fs::read(path).await.map_err(|e| {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                SubmitError::UnreadableFile {
                    name: file.name.clone(),
                }
            })?,
        };

        let part = Part::bytes(data)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|_| SubmitError::UnreadableFile {
                name: file.name.clone(),
            })?;
        form = form.part("evidence[]", part);
    }
    Ok(form)
}
