use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::evidence::EvidenceCollector;
use super::geolocation::LocationField;
use crate::features::incidents::models::IncidentSeverity;

/// Longest description accepted, in characters
pub const DETAILS_MAX_CHARS: usize = 1000;

/// Incident categories offered in the first step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentCategory {
    Pollution,
    Deforestation,
    Wildlife,
    Waste,
    Water,
    Other,
}

impl IncidentCategory {
    pub const ALL: [IncidentCategory; 6] = [
        IncidentCategory::Pollution,
        IncidentCategory::Deforestation,
        IncidentCategory::Wildlife,
        IncidentCategory::Waste,
        IncidentCategory::Water,
        IncidentCategory::Other,
    ];

    /// Value posted in the `category` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentCategory::Pollution => "pollution",
            IncidentCategory::Deforestation => "deforestation",
            IncidentCategory::Wildlife => "wildlife",
            IncidentCategory::Waste => "waste",
            IncidentCategory::Water => "water",
            IncidentCategory::Other => "other",
        }
    }
}

impl fmt::Display for IncidentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("Unknown category '{}'", s.trim()))
    }
}

/// A WGS84 position. Both components are always written together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Map centre used when nothing better is known
    pub const DEFAULT_CENTER: Coordinates = Coordinates {
        lat: 14.5995,
        lng: 120.9842,
    };

    /// `None` unless both components are finite and within range
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }

    /// Form-field rendering, six decimals
    pub fn lat_field(&self) -> String {
        format!("{:.6}", self.lat)
    }

    pub fn lng_field(&self) -> String {
        format!("{:.6}", self.lng)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Everything the reporter has entered so far
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub category: Option<IncidentCategory>,
    pub location: LocationField,
    pub landmark: String,
    details: String,
    pub impact_tags: BTreeSet<String>,
    pub other_impact: String,
    pub severity: IncidentSeverity,
    pub observed_date: Option<NaiveDate>,
    pub observed_time: Option<NaiveTime>,
    pub reporter_name: String,
    pub reporter_email: String,
    pub reporter_phone: String,
    pub evidence: EvidenceCollector,
}

impl ReportDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.coordinates()
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    /// Store the description, cutting it at [`DETAILS_MAX_CHARS`].
    /// Returns true when the input had to be cut.
    pub fn set_details(&mut self, text: &str) -> bool {
        match text.char_indices().nth(DETAILS_MAX_CHARS) {
            Some((cut, _)) => {
                self.details = text[..cut].to_string();
                true
            }
            None => {
                self.details = text.to_string();
                false
            }
        }
    }

    /// Counter shown under the description box, e.g. "12 / 1000"
    pub fn details_counter(&self) -> String {
        format!("{} / {}", self.details.chars().count(), DETAILS_MAX_CHARS)
    }

    /// Check or uncheck an impact tag; returns whether it is now selected
    pub fn toggle_impact(&mut self, tag: &str) -> bool {
        if self.impact_tags.remove(tag) {
            false
        } else {
            self.impact_tags.insert(tag.to_string());
            true
        }
    }

    /// Selected tags followed by the free-text entry, when given
    pub fn impacts(&self) -> Vec<String> {
        let mut impacts: Vec<String> = self.impact_tags.iter().cloned().collect();
        let other = self.other_impact.trim();
        if !other.is_empty() {
            impacts.push(other.to_string());
        }
        impacts
    }
}
