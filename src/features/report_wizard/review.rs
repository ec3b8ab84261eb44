use super::draft::{Coordinates, ReportDraft};
use super::map::{MapProvider, MapView, REVIEW_ZOOM};
use crate::shared::constants::PLACEHOLDER;

/// Read-only rendering of a draft for the final step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub category: String,
    pub location: String,
    pub landmark: String,
    pub impacts: String,
    pub description: String,
    pub severity: String,
    pub date_time: String,
    pub files_count: usize,
    pub files: Vec<String>,
    pub reporter_name: String,
    pub reporter_email: String,
    pub reporter_phone: String,
}

fn or_placeholder(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

pub fn project(draft: &ReportDraft) -> ReviewSummary {
    let date = draft
        .observed_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let time = draft
        .observed_time
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default();

    ReviewSummary {
        category: draft
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        location: draft
            .coordinates()
            .map(|c| c.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        landmark: or_placeholder(&draft.landmark),
        impacts: or_placeholder(&draft.impacts().join(", ")),
        description: or_placeholder(draft.details()),
        severity: draft.severity.label().to_string(),
        date_time: or_placeholder(&format!("{} {}", date, time)),
        files_count: draft.evidence.len(),
        files: draft.evidence.files().iter().map(|f| f.label()).collect(),
        reporter_name: or_placeholder(&draft.reporter_name),
        reporter_email: or_placeholder(&draft.reporter_email),
        reporter_phone: or_placeholder(&draft.reporter_phone),
    }
}

/// Keeps the review summary and the secondary map in step with the draft
///
/// The map is created on the first refresh and only moved afterwards.
pub struct ReviewProjector<P: MapProvider> {
    provider: P,
    map: Option<P::Map>,
    summary: Option<ReviewSummary>,
}

impl<P: MapProvider> ReviewProjector<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            map: None,
            summary: None,
        }
    }

    pub fn refresh(&mut self, draft: &ReportDraft) -> &ReviewSummary {
        let center = draft.coordinates().unwrap_or(Coordinates::DEFAULT_CENTER);

        match self.map.as_mut() {
            Some(map) => {
                map.set_view(center, Some(REVIEW_ZOOM));
                map.set_marker(center);
                map.invalidate_size();
            }
            None => {
                let mut map = self.provider.create(center, REVIEW_ZOOM);
                map.set_marker(center);
                self.map = Some(map);
            }
        }

        self.summary.insert(project(draft))
    }

    /// Summary from the last refresh
    pub fn summary(&self) -> Option<&ReviewSummary> {
        self.summary.as_ref()
    }

    pub fn map(&self) -> Option<&P::Map> {
        self.map.as_ref()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Drop the cached summary; the map widget is kept
    pub fn clear(&mut self) {
        self.summary = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::incidents::models::IncidentSeverity;
    use crate::features::report_wizard::draft::IncidentCategory;
    use crate::features::report_wizard::evidence::FileRef;
    use crate::features::report_wizard::map::testing::{MapEvent, RecordingProvider};
    use crate::features::report_wizard::map::NoopMap;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_empty_draft_renders_placeholders() {
        let summary = project(&ReportDraft::new());

        assert_eq!(summary.category, "—");
        assert_eq!(summary.location, "—");
        assert_eq!(summary.landmark, "—");
        assert_eq!(summary.impacts, "—");
        assert_eq!(summary.description, "—");
        assert_eq!(summary.date_time, "—");
        assert_eq!(summary.severity, "Medium");
        assert_eq!(summary.files_count, 0);
        assert_eq!(summary.reporter_phone, "—");
    }

    #[test]
    fn test_filled_draft_projection() {
        let mut draft = ReportDraft::new();
        draft.category = Some(IncidentCategory::Water);
        draft.location.set_from_map(
            Coordinates::new(14.5, 121.25).unwrap(),
            &mut NoopMap,
        );
        draft.toggle_impact("Water quality");
        draft.other_impact = "Foam".to_string();
        draft.set_details("Foam on the river");
        draft.severity = IncidentSeverity::Critical;
        draft.observed_date = NaiveDate::from_ymd_opt(2024, 3, 5);
        draft
            .evidence
            .add(FileRef::from_bytes("foam.jpg", "image/jpeg", vec![0; 2048]))
            .unwrap();

        let summary = project(&draft);

        assert_eq!(summary.category, "water");
        assert_eq!(summary.location, "14.500000, 121.250000");
        assert_eq!(summary.impacts, "Water quality, Foam");
        assert_eq!(summary.severity, "Critical");
        assert_eq!(summary.date_time, "2024-03-05");
        assert_eq!(summary.files_count, 1);
        assert_eq!(summary.files, vec!["foam.jpg (2 KB)"]);
    }

    #[test]
    fn test_time_only_is_trimmed() {
        let mut draft = ReportDraft::new();
        draft.observed_time = NaiveTime::from_hms_opt(7, 5, 0);
        assert_eq!(project(&draft).date_time, "07:05");
    }

    #[test]
    fn test_review_map_created_once_then_moved() {
        let mut projector = ReviewProjector::new(RecordingProvider::default());
        let mut draft = ReportDraft::new();

        projector.refresh(&draft);
        let at = Coordinates::new(1.0, 2.0).unwrap();
        draft.location.set_from_map(at, &mut NoopMap);
        projector.refresh(&draft);
        projector.refresh(&draft);

        assert_eq!(projector.provider().created, 1);
        let map = projector.map().unwrap();
        assert_eq!(
            map.events[0],
            MapEvent::Created(Coordinates::DEFAULT_CENTER, REVIEW_ZOOM)
        );
        assert_eq!(map.count(|e| matches!(e, MapEvent::Invalidated)), 2);
        assert_eq!(map.last_marker(), Some(at));
    }

    #[test]
    fn test_refresh_replaces_stale_summary() {
        let mut projector = ReviewProjector::new(NoopMap);
        let mut draft = ReportDraft::new();

        projector.refresh(&draft);
        draft.reporter_name = "Ana".to_string();
        projector.refresh(&draft);

        assert_eq!(projector.summary().unwrap().reporter_name, "Ana");
    }
}
