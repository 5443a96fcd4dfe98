//! Run-level report CSV

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Name of the report file in the output directory
pub const REPORT_FILE_NAME: &str = "report.csv";

const REPORT_HEADERS: [&str; 4] = ["url", "status", "output_dir", "error"];

/// Outcome of one input URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Ok,
    Error,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One line of `report.csv`, created exactly once per input URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub url: String,
    pub status: ReportStatus,
    pub output_dir: String,
    /// Empty when `status` is `Ok`
    pub error: String,
}

impl ReportRow {
    pub fn ok(url: impl Into<String>, output_dir: &Path) -> Self {
        Self {
            url: url.into(),
            status: ReportStatus::Ok,
            output_dir: output_dir.display().to_string(),
            error: String::new(),
        }
    }

    pub fn error(url: impl Into<String>, output_dir: &Path, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: ReportStatus::Error,
            output_dir: output_dir.display().to_string(),
            error: error.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ReportStatus::Ok
    }
}

/// Writes all rows, in order, to `path`
///
/// The header is always written, so an empty run still yields a valid file.
pub fn write_report_csv(path: &Path, rows: &[ReportRow]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(REPORT_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
