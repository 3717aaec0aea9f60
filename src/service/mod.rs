//! Service layer containing report rendering for the CLI.

mod report;

pub use report::ReportService;
