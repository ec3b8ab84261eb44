/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Rendered in review summaries for any value the reporter did not provide
pub const PLACEHOLDER: &str = "—";

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - can view the dashboard and manage incidents
pub const ROLE_ADMIN: &str = "admin";

/// Reporter role - can submit incidents
pub const ROLE_REPORTER: &str = "reporter";

// =============================================================================
// INCIDENT IDENTIFIERS
// =============================================================================

/// Prefix for incidents filed through the guided wizard
pub const GUIDED_INCIDENT_PREFIX: &str = "GR";

/// Prefix for incidents filed through the quick form
pub const QUICK_INCIDENT_PREFIX: &str = "INC";
