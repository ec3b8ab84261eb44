use std::path::{Path, PathBuf};

use crate::core::config::UploadConfig;

/// MIME types the picker accepts. The server re-checks content on upload
/// and does not store GIFs.
pub const SUPPORTED_MIME_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "video/mp4",
    "video/quicktime",
    "application/pdf",
];

/// Where the bytes of a picked file live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileHandle {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A file the reporter picked or dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub handle: FileHandle,
}

impl FileRef {
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: data.len() as u64,
            mime_type: mime_type.into(),
            handle: FileHandle::Bytes(data),
        }
    }

    /// Describe a file on disk, guessing its type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            mime_type: mime_from_extension(path).to_string(),
            name,
            size_bytes: metadata.len(),
            handle: FileHandle::Path(path.to_path_buf()),
        })
    }

    /// "river.jpg (12 KB)"
    pub fn label(&self) -> String {
        format!("{} ({} KB)", self.name, (self.size_bytes + 512) / 1024)
    }
}

fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Why a file was not added. The list is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvidenceRejection {
    #[error("File {name} is too large (max {max_mb}MB).")]
    TooLarge { name: String, max_mb: u64 },

    #[error("File {name} has an unsupported format.")]
    UnsupportedType { name: String, mime_type: String },

    #[error("File {name} was not added: at most {max} files per report.")]
    TooMany { name: String, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No file at position {index} (list has {len})")]
pub struct IndexOutOfRange {
    pub index: usize,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Image,
    Video,
    Pdf,
}

/// One row of the rendered file list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePreview {
    /// Position to pass back to [`EvidenceCollector::remove`]
    pub index: usize,
    pub label: String,
    pub kind: PreviewKind,
}

/// Ordered, removable list of evidence files
#[derive(Debug, Clone)]
pub struct EvidenceCollector {
    files: Vec<FileRef>,
    max_file_size: u64,
    max_files: usize,
}

impl Default for EvidenceCollector {
    fn default() -> Self {
        Self::new(
            UploadConfig::DEFAULT_MAX_FILE_SIZE as u64,
            UploadConfig::DEFAULT_MAX_FILES,
        )
    }
}

impl EvidenceCollector {
    pub fn new(max_file_size: u64, max_files: usize) -> Self {
        Self {
            files: Vec::new(),
            max_file_size,
            max_files,
        }
    }

    pub fn add(&mut self, file: FileRef) -> Result<(), EvidenceRejection> {
        if file.size_bytes > self.max_file_size {
            return Err(EvidenceRejection::TooLarge {
                name: file.name,
                max_mb: self.max_file_size / (1024 * 1024),
            });
        }
        if !SUPPORTED_MIME_TYPES.contains(&file.mime_type.as_str()) {
            return Err(EvidenceRejection::UnsupportedType {
                name: file.name,
                mime_type: file.mime_type,
            });
        }
        if self.files.len() >= self.max_files {
            return Err(EvidenceRejection::TooMany {
                name: file.name,
                max: self.max_files,
            });
        }

        self.files.push(file);
        Ok(())
    }

    /// Entry point for both the file picker and drag-and-drop
    pub fn add_all(&mut self, files: impl IntoIterator<Item = FileRef>) -> Vec<EvidenceRejection> {
        files
            .into_iter()
            .filter_map(|file| self.add(file).err())
            .collect()
    }

    pub fn remove(&mut self, index: usize) -> Result<FileRef, IndexOutOfRange> {
        if index >= self.files.len() {
            return Err(IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        Ok(self.files.remove(index))
    }

    /// Rows for the file list. Indices always reflect the current list.
    pub fn previews(&self) -> Vec<FilePreview> {
        self.files
            .iter()
            .enumerate()
            .map(|(index, file)| FilePreview {
                index,
                label: file.label(),
                kind: if file.mime_type.starts_with("image/") {
                    PreviewKind::Image
                } else if file.mime_type.starts_with("video/") {
                    PreviewKind::Video
                } else {
                    PreviewKind::Pdf
                },
            })
            .collect()
    }

    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}
