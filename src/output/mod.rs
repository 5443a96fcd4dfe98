//! Output module for persisting harvest results
//!
//! This module handles:
//! - Writing one pretty-printed `data.json` record per harvested URL
//! - Writing the run-level `report.csv`
//! - Exporting the consolidated `data.csv`
//! - Recording run statistics

pub mod export;
pub mod record;
pub mod report;
pub mod stats;

pub use export::{write_data_csv, ExportRow, EXPORT_FILE_NAME};
pub use record::{write_record, ItemCounts, ItemRecord, RECORD_FILE_NAME};
pub use report::{write_report_csv, ReportRow, ReportStatus, REPORT_FILE_NAME};
pub use stats::{print_statistics, RunStatistics};
