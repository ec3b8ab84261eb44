use chrono::{NaiveDate, NaiveTime};

use super::draft::{Coordinates, IncidentCategory, ReportDraft};
use super::evidence::FileRef;
use super::geolocation::{GeolocationError, LocationSource, LocationWrite, LookupTicket};
use super::map::{MapProvider, MapView};
use super::review::{ReviewProjector, ReviewSummary};
use crate::features::incidents::models::IncidentSeverity;

/// Wizard steps in order. `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    Category,
    Location,
    Details,
    Evidence,
    ReporterInfo,
    Review,
    Submitted,
}

impl WizardStep {
    pub const TOTAL: usize = 6;

    const ORDER: [WizardStep; 6] = [
        WizardStep::Category,
        WizardStep::Location,
        WizardStep::Details,
        WizardStep::Evidence,
        WizardStep::ReporterInfo,
        WizardStep::Review,
    ];

    /// 1-based position; `Submitted` counts as the last step
    pub fn number(&self) -> usize {
        match self {
            WizardStep::Submitted => Self::TOTAL,
            step => Self::ORDER.iter().position(|s| s == step).map_or(1, |i| i + 1),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Category => "Category",
            WizardStep::Location => "Location",
            WizardStep::Details => "Details",
            WizardStep::Evidence => "Evidence",
            WizardStep::ReporterInfo => "Reporter Info",
            WizardStep::Review => "Review & Submit",
            WizardStep::Submitted => "Submitted",
        }
    }

    fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Review | WizardStep::Submitted => None,
            step => Self::ORDER.get(step.number()).copied(),
        }
    }

    fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Category | WizardStep::Submitted => None,
            step => Self::ORDER.get(step.number() - 2).copied(),
        }
    }
}

/// A step's required input is missing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StepBlocked {
    /// Step the reporter has to complete
    pub step: WizardStep,
    pub message: String,
}

impl StepBlocked {
    fn new(step: WizardStep, message: &str) -> Self {
        Self {
            step,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub step: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f32 {
        self.step as f32 / self.total as f32 * 100.0
    }

    /// "2 of 6"
    pub fn label(&self) -> String {
        format!("{} of {}", self.step, self.total)
    }
}

/// Everything posted to the guided endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    pub category: IncidentCategory,
    pub coordinates: Coordinates,
    pub landmark: String,
    /// Selected tags only; the free-text entry travels in `other_impacts`
    pub impacts: Vec<String>,
    pub other_impacts: String,
    pub details: String,
    pub severity: IncidentSeverity,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub files: Vec<FileRef>,
}

const CONFIRM_MESSAGE: &str = "Please confirm the accuracy of your report before submitting.";

/// Six-step guided report flow
pub struct Wizard<M: MapView, P: MapProvider> {
    step: WizardStep,
    draft: ReportDraft,
    primary_map: M,
    review: ReviewProjector<P>,
}

impl<M: MapView, P: MapProvider> Wizard<M, P> {
    pub fn new(primary_map: M, review_maps: P) -> Self {
        Self {
            step: WizardStep::Category,
            draft: ReportDraft::new(),
            primary_map,
            review: ReviewProjector::new(review_maps),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ReportDraft {
        &mut self.draft
    }

    pub fn primary_map(&self) -> &M {
        &self.primary_map
    }

    pub fn review(&self) -> &ReviewProjector<P> {
        &self.review
    }

    /// Summary shown on the review step, recomputed on every entry
    pub fn review_summary(&self) -> Option<&ReviewSummary> {
        self.review.summary()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            step: self.step.number(),
            total: WizardStep::TOTAL,
        }
    }

    /// Check the inputs `step` requires before the reporter may leave it
    pub fn check_step(&self, step: WizardStep) -> Result<(), StepBlocked> {
        let draft = &self.draft;
        match step {
            WizardStep::Category if draft.category.is_none() => Err(StepBlocked::new(
                step,
                "Please select an incident category before continuing.",
            )),
            WizardStep::Location if draft.coordinates().is_none() => {
                Err(StepBlocked::new(step, "Please select a location."))
            }
            WizardStep::Details if draft.details().trim().is_empty() => {
                Err(StepBlocked::new(step, "Please add a description in Details."))
            }
            WizardStep::ReporterInfo
                if draft.reporter_name.trim().is_empty()
                    || draft.reporter_email.trim().is_empty() =>
            {
                Err(StepBlocked::new(
                    step,
                    "Please provide your name and email in Reporter Information before proceeding.",
                ))
            }
            _ => Ok(()),
        }
    }

    /// Move one step forward if the current step is complete
    pub fn advance(&mut self) -> Result<WizardStep, StepBlocked> {
        self.check_step(self.step)?;
        match self.step.next() {
            Some(next) => {
                self.enter(next);
                Ok(next)
            }
            None if self.step == WizardStep::Review => {
                Err(StepBlocked::new(WizardStep::Review, CONFIRM_MESSAGE))
            }
            None => Err(StepBlocked::new(self.step, "This report has already been submitted.")),
        }
    }

    /// Move one step back. Never validates.
    pub fn retreat(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.enter(previous);
        }
        self.step
    }

    /// Jump to `target`. Backward jumps always succeed; forward jumps need
    /// every step in between to be complete.
    pub fn go_to(&mut self, target: WizardStep) -> Result<WizardStep, StepBlocked> {
        if target == WizardStep::Submitted || self.step == WizardStep::Submitted {
            return Err(StepBlocked::new(self.step, "Use submit to finish the report."));
        }
        if target > self.step {
            for step in WizardStep::ORDER {
                if step >= self.step && step < target {
                    self.check_step(step)?;
                }
            }
        }
        self.enter(target);
        Ok(target)
    }

    /// Final check before posting. On a missing input the wizard moves to
    /// the step that needs it.
    pub fn confirm_and_submit(&mut self, confirmed: bool) -> Result<SubmissionPayload, StepBlocked> {
        if self.step != WizardStep::Review {
            return Err(StepBlocked::new(self.step, "Review the report before submitting."));
        }
        if !confirmed {
            return Err(StepBlocked::new(WizardStep::Review, CONFIRM_MESSAGE));
        }

        for step in WizardStep::ORDER {
            if let Err(blocked) = self.check_step(step) {
                self.enter(blocked.step);
                return Err(blocked);
            }
        }

        let draft = &self.draft;
        let (Some(category), Some(coordinates)) = (draft.category, draft.coordinates()) else {
            return Err(StepBlocked::new(WizardStep::Category, "Category required."));
        };

        Ok(SubmissionPayload {
            category,
            coordinates,
            landmark: draft.landmark.trim().to_string(),
            impacts: draft.impact_tags.iter().cloned().collect(),
            other_impacts: draft.other_impact.trim().to_string(),
            details: draft.details().to_string(),
            severity: draft.severity,
            date: draft.observed_date,
            time: draft.observed_time,
            full_name: draft.reporter_name.trim().to_string(),
            email: draft.reporter_email.trim().to_string(),
            phone: draft.reporter_phone.trim().to_string(),
            files: draft.evidence.files().to_vec(),
        })
    }

    /// Record a successful server response. The draft is discarded.
    pub fn mark_submitted(&mut self) {
        self.draft = ReportDraft::new();
        self.review.clear();
        self.step = WizardStep::Submitted;
    }

    /// Discard the draft and start over
    pub fn reset(&mut self) {
        self.draft = ReportDraft::new();
        self.review.clear();
        self.step = WizardStep::Category;
    }

    pub fn begin_location_lookup(&self) -> LookupTicket {
        self.draft.location.begin_lookup()
    }

    /// Apply a finished device or address lookup
    pub fn apply_location(
        &mut self,
        ticket: LookupTicket,
        result: Result<Coordinates, GeolocationError>,
        source: LocationSource,
    ) -> Result<LocationWrite, GeolocationError> {
        let at = result?;
        Ok(self
            .draft
            .location
            .apply(ticket, at, source, &mut self.primary_map))
    }

    pub fn click_map(&mut self, at: Coordinates) -> LocationWrite {
        self.draft.location.set_from_map(at, &mut self.primary_map)
    }

    fn enter(&mut self, step: WizardStep) {
        self.step = step;
        match step {
            WizardStep::Location => self.primary_map.invalidate_size(),
            WizardStep::Review => {
                self.review.refresh(&self.draft);
            }
            _ => {}
        }
    }
}
