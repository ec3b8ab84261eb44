//! Client-side state for the report wizard and the quick report form
//!
//! Nothing here renders. A front-end drives these types from user input and
//! draws from the snapshots they expose; maps are reached through
//! [`MapView`](map::MapView) so tests can substitute a recording fake.

pub mod client;
pub mod draft;
pub mod evidence;
pub mod geolocation;
pub mod machine;
pub mod map;
pub mod quick;
pub mod review;

pub use client::{SubmissionClient, SubmitError};
pub use draft::{Coordinates, IncidentCategory, ReportDraft};
pub use evidence::{EvidenceCollector, EvidenceRejection, FileHandle, FileRef};
pub use geolocation::{DeviceLocator, GeolocationError, GeolocationResolver, LocationField};
pub use machine::{StepBlocked, SubmissionPayload, Wizard, WizardStep};
pub use map::{MapProvider, MapView};
pub use quick::QuickReportForm;
pub use review::{ReviewProjector, ReviewSummary};
