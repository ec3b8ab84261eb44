use std::sync::Arc;

use super::content_type::{detect, Detected, EvidenceKind};
use super::submission_form::{UploadBody, UploadedFile};
use super::validation::FieldErrors;
use crate::features::incidents::models::IncidentSource;
use crate::modules::storage::{EvidenceStorage, StoredObject};

/// An evidence file that made it to storage
#[derive(Debug, Clone)]
pub struct StoredEvidence {
    pub index: usize,
    pub kind: EvidenceKind,
    pub original_name: String,
    pub object: StoredObject,
}

/// Result of ingesting every file of one submission
#[derive(Debug, Default)]
pub struct IngestReport {
    pub stored: Vec<StoredEvidence>,
    /// `file_{i}` -> reason, for each file that was not stored
    pub errors: FieldErrors,
}

/// Checks uploaded files and writes the accepted ones to storage
pub struct EvidenceService {
    storage: Arc<dyn EvidenceStorage>,
    max_file_size: usize,
    max_files: usize,
}

impl EvidenceService {
    pub fn new(storage: Arc<dyn EvidenceStorage>, max_file_size: usize, max_files: usize) -> Self {
        Self {
            storage,
            max_file_size,
            max_files,
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Process every file independently. One bad file never stops the rest.
    pub async fn ingest(&self, files: &[UploadedFile], source: IncidentSource) -> IngestReport {
        let mut report = IngestReport::default();

        for file in files {
            match self.ingest_one(file, source).await {
                Ok(stored) => report.stored.push(stored),
                Err(message) => {
                    tracing::info!("Evidence {} rejected: {}", file.error_key(), message);
                    report.errors.insert(file.error_key(), message);
                }
            }
        }

        report
    }

    async fn ingest_one(
        &self,
        file: &UploadedFile,
        source: IncidentSource,
    ) -> Result<StoredEvidence, String> {
        let name = file.display_name();

        if file.index >= self.max_files {
            return Err(format!(
                "{} was not uploaded: at most {} files per report.",
                name, self.max_files
            ));
        }

        let data = match &file.body {
            UploadBody::Complete(data) if data.len() <= self.max_file_size => data,
            UploadBody::Complete(_) | UploadBody::Oversized { .. } => {
                return Err(format!(
                    "{} exceeds {}MB limit.",
                    name,
                    self.max_file_size / (1024 * 1024)
                ));
            }
            UploadBody::Failed(reason) => {
                tracing::warn!("Upload error for {}: {}", file.error_key(), reason);
                return Err(format!("Upload error for file #{}", file.index));
            }
        };

        let kind = match detect(data) {
            Detected::Allowed(kind) => kind,
            Detected::Rejected(mime) => {
                return Err(format!("{} has an unsupported type ({}).", name, mime));
            }
            Detected::Unknown => {
                let mime = file.declared_type.as_deref().unwrap_or("unknown");
                return Err(format!("{} has an unsupported type ({}).", name, mime));
            }
        };

        let object = self
            .storage
            .store(source.file_prefix(), kind.extension(), data)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store {}: {}", file.error_key(), e);
                format!("Failed to save file {}.", name)
            })?;

        Ok(StoredEvidence {
            index: file.index,
            kind,
            original_name: name,
            object,
        })
    }

    /// Best-effort removal of files written for a submission that failed
    pub async fn discard(&self, stored: &[StoredEvidence]) {
        for evidence in stored {
            self.discard_one(evidence).await;
        }
    }

    pub async fn discard_one(&self, evidence: &StoredEvidence) {
        if let Err(e) = self.storage.remove(&evidence.object.name).await {
            tracing::warn!("Failed to remove {}: {}", evidence.object.name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::incidents::services::SubmissionForm;
    use crate::modules::storage::LocalEvidenceStorage;

    const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00";

    fn service(dir: &std::path::Path, max_file_size: usize, max_files: usize) -> EvidenceService {
        EvidenceService::new(
            Arc::new(LocalEvidenceStorage::new(dir)),
            max_file_size,
            max_files,
        )
    }

    #[tokio::test]
    async fn test_mixed_batch_keeps_good_files() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), 10 * 1024 * 1024, 10);

        let mut form = SubmissionForm::new()
            .with_file("river.jpg", JPEG)
            .with_file("funny.gif", b"GIF89a\x01\x00");
        form.push_file(
            "huge.mp4".into(),
            Some("video/mp4".into()),
            UploadBody::Oversized { size: 11 * 1024 * 1024 },
        );
        form.push_file("broken.png".into(), None, UploadBody::Failed("reset".into()));

        let report = svc.ingest(&form.files, IncidentSource::Guided).await;

        assert_eq!(report.stored.len(), 1);
        let stored = &report.stored[0];
        assert_eq!(stored.index, 0);
        assert_eq!(stored.kind, EvidenceKind::Jpeg);
        assert_eq!(stored.original_name, "river.jpg");
        assert!(stored.object.name.starts_with("guided_"));
        assert!(stored.object.name.ends_with(".jpg"));
        assert!(dir.path().join(&stored.object.name).exists());

        assert_eq!(report.errors["file_1"], "funny.gif has an unsupported type (image/gif).");
        assert_eq!(report.errors["file_2"], "huge.mp4 exceeds 10MB limit.");
        assert_eq!(report.errors["file_3"], "Upload error for file #3");
    }

    #[tokio::test]
    async fn test_extension_comes_from_content_not_name() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), 1024, 10);
        let form = SubmissionForm::new().with_file("../../evil.php", b"%PDF-1.4 body");

        let report = svc.ingest(&form.files, IncidentSource::Quick).await;

        let name = &report.stored[0].object.name;
        assert!(name.starts_with("quick_"));
        assert!(name.ends_with(".pdf"));
        assert!(!name.contains("evil"));
        assert_eq!(report.stored[0].original_name, "evil.php");
    }

    #[tokio::test]
    async fn test_files_beyond_cap_fail_individually() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), 1024, 2);
        let form = SubmissionForm::new()
            .with_file("a.jpg", JPEG)
            .with_file("b.jpg", JPEG)
            .with_file("c.jpg", JPEG);

        let report = svc.ingest(&form.files, IncidentSource::Guided).await;

        assert_eq!(report.stored.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors["file_2"].contains("at most 2 files"));
    }

    #[tokio::test]
    async fn test_discard_removes_written_files() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), 1024, 10);
        let form = SubmissionForm::new().with_file("a.jpg", JPEG).with_file("b.jpg", JPEG);

        let report = svc.ingest(&form.files, IncidentSource::Guided).await;
        svc.discard(&report.stored).await;

        for stored in &report.stored {
            assert!(!dir.path().join(&stored.object.name).exists());
        }
    }
}
