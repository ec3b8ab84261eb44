use super::draft::{Coordinates, IncidentCategory, DETAILS_MAX_CHARS};
use super::evidence::{EvidenceCollector, FileRef};
use super::geolocation::{GeolocationResolver, LocationField, LocationSource, LocationWrite};
use super::map::MapView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QuickFormError {
    #[error("Please select an incident category.")]
    MissingCategory,

    #[error("Please select a location.")]
    MissingLocation,

    #[error("A report requires either a description or at least one file/photo.")]
    MissingContent,
}

/// Everything posted to the quick endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct QuickPayload {
    pub category: IncidentCategory,
    pub coordinates: Coordinates,
    pub description: String,
    pub files: Vec<FileRef>,
}

/// Single-step report form
#[derive(Debug, Clone, Default)]
pub struct QuickReportForm {
    pub category: Option<IncidentCategory>,
    pub location: LocationField,
    description: String,
    pub evidence: EvidenceCollector,
}

impl QuickReportForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the form on the device position, or on the default centre when
    /// no fix is available
    pub async fn locate<M: MapView>(
        &mut self,
        resolver: &GeolocationResolver,
        map: &mut M,
    ) -> LocationWrite {
        let ticket = self.location.begin_lookup();
        match resolver.locate_device().await {
            Ok(at) => self.location.apply(ticket, at, LocationSource::Device, map),
            Err(e) => {
                tracing::debug!("Device location unavailable, using default centre: {}", e);
                self.location
                    .apply(ticket, Coordinates::DEFAULT_CENTER, LocationSource::Fallback, map)
            }
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Same cap as the guided details field. Returns true when cut.
    pub fn set_description(&mut self, text: &str) -> bool {
        match text.char_indices().nth(DETAILS_MAX_CHARS) {
            Some((cut, _)) => {
                self.description = text[..cut].to_string();
                true
            }
            None => {
                self.description = text.to_string();
                false
            }
        }
    }

    pub fn validate(&self) -> Result<QuickPayload, QuickFormError> {
        let category = self.category.ok_or(QuickFormError::MissingCategory)?;
        let coordinates = self
            .location
            .coordinates()
            .ok_or(QuickFormError::MissingLocation)?;

        let description = self.description.trim();
        if description.is_empty() && self.evidence.is_empty() {
            return Err(QuickFormError::MissingContent);
        }

        Ok(QuickPayload {
            category,
            coordinates,
            description: description.to_string(),
            files: self.evidence.files().to_vec(),
        })
    }

    pub fn reset(&mut self) {
        self.category = None;
        self.location.clear();
        self.description.clear();
        self.evidence.clear();
    }
}
