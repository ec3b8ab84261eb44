use std::collections::HashMap;

/// Body of one uploaded file part, as far as it was read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadBody {
    /// Fully buffered, within the size cap
    Complete(Vec<u8>),
    /// Exceeded the size cap; the bytes were discarded
    Oversized { size: usize },
    /// The part could not be read
    Failed(String),
}

/// One `evidence[]` part of a submission
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// 0-based position among the uploaded files
    pub index: usize,
    /// Client-supplied file name. Display only, never used in a path.
    pub original_name: String,
    pub declared_type: Option<String>,
    pub body: UploadBody,
}

impl UploadedFile {
    pub fn error_key(&self) -> String {
        format!("file_{}", self.index)
    }

    /// Name safe to echo back in messages and store as metadata
    pub fn display_name(&self) -> String {
        let base = self
            .original_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();
        if base.is_empty() {
            format!("File #{}", self.index + 1)
        } else {
            base.to_string()
        }
    }
}

/// A buffered multipart submission
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    fields: HashMap<String, String>,
    /// Repeated `impacts[]` values in upload order
    pub impacts: Vec<String>,
    pub files: Vec<UploadedFile>,
}

impl SubmissionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a text part. Repeated `impacts[]` parts accumulate; for any
    /// other name the last value wins.
    pub fn push_text(&mut self, name: &str, value: String) {
        match name {
            "impacts[]" | "impacts" => self.impacts.push(value),
            _ => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }

    pub fn push_file(&mut self, original_name: String, declared_type: Option<String>, body: UploadBody) {
        let index = self.files.len();
        self.files.push(UploadedFile {
            index,
            original_name,
            declared_type,
            body,
        });
    }

    /// Raw value of a text field, "" when absent
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }

    #[cfg(test)]
    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.push_text(name, value.to_string());
        self
    }

    #[cfg(test)]
    pub fn with_file(mut self, name: &str, data: &[u8]) -> Self {
        self.push_file(name.to_string(), None, UploadBody::Complete(data.to_vec()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impacts_accumulate_and_fields_overwrite() {
        let form = SubmissionForm::new()
            .with_text("impacts[]", "Air quality")
            .with_text("impacts[]", "Wildlife")
            .with_text("category", "waste")
            .with_text("category", "water");

        assert_eq!(form.impacts, vec!["Air quality", "Wildlife"]);
        assert_eq!(form.text("category"), "water");
        assert_eq!(form.text("missing"), "");
    }

    #[test]
    fn test_files_are_indexed_in_upload_order() {
        let form = SubmissionForm::new()
            .with_file("a.jpg", b"a")
            .with_file("b.jpg", b"b");

        assert_eq!(form.files[0].error_key(), "file_0");
        assert_eq!(form.files[1].error_key(), "file_1");
    }

    #[test]
    fn test_display_name_strips_client_paths() {
        let form = SubmissionForm::new()
            .with_file("C:\\Users\\me\\river.jpg", b"x")
            .with_file("../../etc/passwd", b"x")
            .with_file("", b"x");

        assert_eq!(form.files[0].display_name(), "river.jpg");
        assert_eq!(form.files[1].display_name(), "passwd");
        assert_eq!(form.files[2].display_name(), "File #3");
    }
}
