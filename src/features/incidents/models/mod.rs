mod evidence;
mod incident;
mod location;

pub use evidence::{CreateEvidence, Evidence};
pub use incident::{CreateIncident, Incident, IncidentSeverity, IncidentSource, IncidentStatus};
pub use location::{CreateLocation, Location};
