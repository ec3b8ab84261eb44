use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::incidents::dtos::{
    GuidedReportForm, GuidedSubmissionResponse, QuickReportForm, QuickSubmissionResponse,
};
use crate::features::incidents::services::{
    SubmissionForm, SubmissionOutcome, SubmissionService, UploadBody,
};

/// Submit a report through the guided wizard
///
/// Core fields are validated first; when they fail nothing is stored and
/// `errors` maps each field to its message. Individual evidence files may
/// still fail after the incident is stored, reported as `file_{i}` errors.
#[utoipa::path(
    post,
    path = "/api/reports/guided",
    tag = "reports",
    request_body(
        content = GuidedReportForm,
        content_type = "multipart/form-data",
        description = "Guided report fields with repeated `impacts[]` and `evidence[]` parts",
    ),
    responses(
        (status = 200, description = "Report stored, possibly with file errors", body = GuidedSubmissionResponse),
        (status = 400, description = "Validation failed", body = GuidedSubmissionResponse),
        (status = 405, description = "Invalid request method"),
        (status = 500, description = "Report could not be stored")
    )
)]
pub async fn submit_guided_report(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<SubmissionService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<GuidedSubmissionResponse>)> {
    let form = read_submission_form(multipart, service.max_file_size()).await?;
    let outcome = service
        .submit_guided(form, user.map(|u| u.user_id))
        .await?;

    Ok((status_for(&outcome), Json(outcome.into())))
}

/// Submit a single-step quick report
#[utoipa::path(
    post,
    path = "/api/reports/quick",
    tag = "reports",
    request_body(
        content = QuickReportForm,
        content_type = "multipart/form-data",
        description = "Quick report fields with repeated `evidence[]` parts",
    ),
    responses(
        (status = 200, description = "Report stored, possibly with file errors", body = QuickSubmissionResponse),
        (status = 400, description = "Validation failed", body = QuickSubmissionResponse),
        (status = 405, description = "Invalid request method"),
        (status = 500, description = "Report could not be stored")
    )
)]
pub async fn submit_quick_report(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<SubmissionService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<QuickSubmissionResponse>)> {
    let form = read_submission_form(multipart, service.max_file_size()).await?;
    let outcome = service.submit_quick(form, user.map(|u| u.user_id)).await?;

    Ok((status_for(&outcome), Json(outcome.into())))
}

/// Any verb other than POST on a submission endpoint
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn status_for(outcome: &SubmissionOutcome) -> StatusCode {
    match outcome {
        SubmissionOutcome::Rejected { .. } => StatusCode::BAD_REQUEST,
        SubmissionOutcome::Accepted { .. } | SubmissionOutcome::PartiallyAccepted { .. } => {
            StatusCode::OK
        }
    }
}

/// Buffer every part of a submission
pub async fn read_submission_form(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<SubmissionForm> {
    let mut form = SubmissionForm::new();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "evidence[]" | "evidence" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let body = read_file_body(&mut field, max_file_size).await;

                // Browsers send one empty part when no file was picked
                if file_name.is_empty() && body == UploadBody::Complete(Vec::new()) {
                    continue;
                }
                form.push_file(file_name, content_type, body);
            }
            _ => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read field {}: {}", field_name, e))
                })?;
                form.push_text(&field_name, text);
            }
        }
    }

    Ok(form)
}

/// Read a file part chunk by chunk, keeping at most `limit` bytes
async fn read_file_body(field: &mut Field<'_>, limit: usize) -> UploadBody {
    let mut data = Vec::new();
    let mut size = 0usize;

    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                size += chunk.len();
                if size <= limit {
                    data.extend_from_slice(&chunk);
                } else if !data.is_empty() {
                    data = Vec::new();
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!("Failed to read file bytes: {}", e);
                return UploadBody::Failed(e.to_string());
            }
        }
    }

    if size > limit {
        UploadBody::Oversized { size }
    } else {
        UploadBody::Complete(data)
    }
}

#[cfg(test)]
mod tests {
    use crate::features::incidents::routes::routes;
    use crate::features::incidents::services::incident_repository::testing::InMemoryIncidentRepository;
    use crate::features::incidents::services::{EvidenceService, SubmissionService};
    use crate::modules::storage::LocalEvidenceStorage;
    use crate::shared::test_helpers::with_reporter_auth;
    use crate::shared::validation::INCIDENT_ID_REGEX;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::Value;
    use std::sync::Arc;

    const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00\x01";
    const MAX_FILE_SIZE: usize = 1024 * 1024;

    struct Harness {
        server: TestServer,
        repo: Arc<InMemoryIncidentRepository>,
        dir: tempfile::TempDir,
    }

    fn harness_with(repo: InMemoryIncidentRepository, authenticated: bool) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(repo);
        let evidence = EvidenceService::new(
            Arc::new(LocalEvidenceStorage::new(dir.path())),
            MAX_FILE_SIZE,
            10,
        );
        let service = Arc::new(SubmissionService::new(repo.clone(), evidence));
        let mut app = routes(service, 4 * 1024 * 1024);
        if authenticated {
            app = with_reporter_auth(app);
        }

        Harness {
            server: TestServer::new(app).unwrap(),
            repo,
            dir,
        }
    }

    fn harness() -> Harness {
        harness_with(InMemoryIncidentRepository::default(), false)
    }

    fn guided_form() -> MultipartForm {
        MultipartForm::new()
            .add_text("category", "pollution")
            .add_text("latitude", "14.599500")
            .add_text("longitude", "120.984200")
            .add_text("landmark", "Jones Bridge")
            .add_text("impacts[]", "Water quality")
            .add_text("impacts[]", "Odor")
            .add_text("details", "Oil slick along the bank")
            .add_text("severity", "High")
            .add_text("date", "2024-03-05")
            .add_text("time", "08:30")
            .add_text("fullname", "Ana Reyes")
            .add_text("email", "ana@example.com")
            .add_text("phone", "+63 912 345 6789")
    }

    fn jpeg(name: &str) -> Part {
        Part::bytes(JPEG.to_vec())
            .file_name(name)
            .mime_type("image/jpeg")
    }

    fn stored_files(dir: &tempfile::TempDir) -> Vec<String> {
        std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_guided_submission_succeeds() {
        let h = harness();

        let response = h
            .server
            .post("/api/reports/guided")
            .multipart(guided_form().add_part("evidence[]", jpeg("river.jpg")))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Guided report submitted successfully!");
        let report_id = body["report_id"].as_str().unwrap();
        assert!(report_id.starts_with("GR-"));
        assert!(INCIDENT_ID_REGEX.is_match(report_id));
        assert_eq!(body["files"].as_array().unwrap().len(), 1);

        let incidents = h.repo.incidents.lock().unwrap();
        assert_eq!(incidents[0].observed_impacts, vec!["Water quality", "Odor"]);
        assert_eq!(incidents[0].reporter_id, None);
    }

    #[tokio::test]
    async fn test_oversized_file_gives_partial_success() {
        let h = harness();
        let big = Part::bytes(vec![0xFF; MAX_FILE_SIZE + 1])
            .file_name("big.jpg")
            .mime_type("image/jpeg");

        let response = h
            .server
            .post("/api/reports/guided")
            .multipart(
                guided_form()
                    .add_part("evidence[]", jpeg("small.jpg"))
                    .add_part("evidence[]", big),
            )
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Report submitted, but some files failed to upload.");
        assert!(body["report_id"].as_str().is_some());
        assert_eq!(body["errors"]["file_1"], "big.jpg exceeds 1MB limit.");
        assert_eq!(body["files"].as_array().unwrap().len(), 1);
        assert_eq!(stored_files(&h.dir).len(), 1);
    }

    #[tokio::test]
    async fn test_empty_category_is_rejected_without_side_effects() {
        let h = harness();

        let response = h
            .server
            .post("/api/reports/guided")
            .multipart(
                guided_form()
                    .add_text("category", "")
                    .add_part("evidence[]", jpeg("river.jpg")),
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"]["category"], "Incident category is required.");
        assert!(body.get("report_id").is_none());
        assert_eq!(h.repo.incident_count(), 0);
        assert!(stored_files(&h.dir).is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_submissions_get_distinct_ids_and_names() {
        let h = harness();

        let submit = || async {
            h.server
                .post("/api/reports/guided")
                .multipart(guided_form().add_part("evidence[]", jpeg("same.jpg")))
                .await
        };
        let (a, b) = tokio::join!(submit(), submit());

        let (a, b): (Value, Value) = (a.json(), b.json());
        assert_ne!(a["report_id"], b["report_id"]);
        assert_ne!(a["files"][0], b["files"][0]);
        assert_eq!(stored_files(&h.dir).len(), 2);
    }

    #[tokio::test]
    async fn test_other_methods_get_405_json() {
        let h = harness();

        for path in ["/api/reports/guided", "/api/reports/quick"] {
            let response = h.server.get(path).await;
            response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
            let body: Value = response.json();
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "Invalid request method.");
        }
    }

    #[tokio::test]
    async fn test_quick_submission_with_only_evidence() {
        let h = harness();

        let response = h
            .server
            .post("/api/reports/quick")
            .multipart(
                MultipartForm::new()
                    .add_text("description", "")
                    .add_text("category", "waste")
                    .add_text("latitude", "14.6")
                    .add_text("longitude", "121.0")
                    .add_part("evidence[]", jpeg("dump.jpg")),
            )
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Report submitted successfully!");
        assert!(body["incident_id"].as_str().unwrap().starts_with("INC-"));
        assert!(stored_files(&h.dir)[0].starts_with("quick_"));
    }

    #[tokio::test]
    async fn test_quick_submission_needs_description_or_file() {
        let h = harness();

        let response = h
            .server
            .post("/api/reports/quick")
            .multipart(
                MultipartForm::new()
                    .add_text("category", "waste")
                    .add_text("latitude", "14.6")
                    .add_text("longitude", "121.0"),
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["errors"]["description"].is_string());
        assert!(body.get("incident_id").is_none());
    }

    #[tokio::test]
    async fn test_signed_in_reporter_is_recorded() {
        let h = harness_with(InMemoryIncidentRepository::default(), true);

        h.server
            .post("/api/reports/guided")
            .multipart(guided_form())
            .await
            .assert_status_ok();

        assert!(h.repo.incidents.lock().unwrap()[0].reporter_id.is_some());
    }

    #[tokio::test]
    async fn test_persistence_failure_is_500_and_cleans_up() {
        let h = harness_with(InMemoryIncidentRepository::failing(), false);

        let response = h
            .server
            .post("/api/reports/guided")
            .multipart(guided_form().add_part("evidence[]", jpeg("river.jpg")))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(stored_files(&h.dir).is_empty());
    }
}
