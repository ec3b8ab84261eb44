pub mod auth;
pub mod dashboard;
pub mod geocoding;
pub mod incidents;
pub mod report_wizard;
