//! Evidence content detection from leading bytes
//!
//! The declared MIME type and the client's extension are ignored; only the
//! file's own signature decides what gets stored.

/// File kinds accepted as evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceKind {
    Jpeg,
    Png,
    Mp4,
    QuickTime,
    Pdf,
}

impl EvidenceKind {
    /// Canonical extension for stored files
    pub fn extension(&self) -> &'static str {
        match self {
            EvidenceKind::Jpeg => "jpg",
            EvidenceKind::Png => "png",
            EvidenceKind::Mp4 => "mp4",
            EvidenceKind::QuickTime => "mov",
            EvidenceKind::Pdf => "pdf",
        }
    }

    /// Label stored in `evidence.file_type`
    pub fn label(&self) -> &'static str {
        match self {
            EvidenceKind::Jpeg => "JPG",
            EvidenceKind::Png => "PNG",
            EvidenceKind::Mp4 => "MP4",
            EvidenceKind::QuickTime => "MOV",
            EvidenceKind::Pdf => "PDF",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            EvidenceKind::Jpeg => "image/jpeg",
            EvidenceKind::Png => "image/png",
            EvidenceKind::Mp4 => "video/mp4",
            EvidenceKind::QuickTime => "video/quicktime",
            EvidenceKind::Pdf => "application/pdf",
        }
    }
}

/// What the leading bytes say about a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detected {
    Allowed(EvidenceKind),
    /// Recognised but not accepted as evidence
    Rejected(&'static str),
    Unknown,
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

pub fn detect(data: &[u8]) -> Detected {
    if data.starts_with(b"\xFF\xD8\xFF") {
        return Detected::Allowed(EvidenceKind::Jpeg);
    }
    if data.starts_with(PNG_SIGNATURE) {
        return Detected::Allowed(EvidenceKind::Png);
    }
    if data.starts_with(b"%PDF-") {
        return Detected::Allowed(EvidenceKind::Pdf);
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Detected::Rejected("image/gif");
    }
    if let Some(kind) = detect_iso_media(data) {
        return kind;
    }
    Detected::Unknown
}

/// ISO base media files start with a box `[size:u32][type:4]`; `ftyp`
/// carries the major brand that tells MP4 from QuickTime.
fn detect_iso_media(data: &[u8]) -> Option<Detected> {
    let box_type = data.get(4..8)?;
    match box_type {
        b"ftyp" => {
            let brand = data.get(8..12)?;
            if brand == b"qt  " {
                Some(Detected::Allowed(EvidenceKind::QuickTime))
            } else if brand.starts_with(b"3g") {
                Some(Detected::Rejected("video/3gpp"))
            } else if brand == b"avif" || brand == b"heic" || brand == b"mif1" {
                Some(Detected::Rejected("image/heif"))
            } else {
                Some(Detected::Allowed(EvidenceKind::Mp4))
            }
        }
        // Legacy QuickTime files may open with an atom other than ftyp
        b"moov" | b"mdat" | b"wide" | b"free" | b"skip" | b"pnot" => {
            Some(Detected::Allowed(EvidenceKind::QuickTime))
        }
        _ => None,
    }
}
