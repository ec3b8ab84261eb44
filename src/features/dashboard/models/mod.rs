mod generated_report;

pub use generated_report::{GeneratedReport, NewGeneratedReport, ReportFormat};
