//! Run statistics
//!
//! Counts collected while a run progresses and printed once it finishes.

use crate::output::report::ReportRow;
use chrono::{DateTime, Utc};

/// Summary of one harvest run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    /// When processing of the first URL began
    pub started_at: DateTime<Utc>,

    /// When the report was written
    pub finished_at: DateTime<Utc>,

    /// URLs processed after filtering
    pub total: usize,

    /// URLs that produced a record
    pub ok: usize,

    /// URLs that ended in an error row
    pub errors: usize,

    /// Images saved across all items
    pub images_downloaded: usize,
}

impl RunStatistics {
    /// Derives the counts from the final report rows
    pub fn from_rows(
        rows: &[ReportRow],
        images_downloaded: usize,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let ok = rows.iter().filter(|row| row.is_ok()).count();

        Self {
            started_at,
            finished_at,
            total: rows.len(),
            ok,
            errors: rows.len() - ok,
            images_downloaded,
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Percentage of URLs that succeeded; 0 for an empty run
    pub fn success_rate(&self) -> f64 {
        if self.total > 0 {
            (self.ok as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!("  Finished: {}", stats.finished_at.to_rfc3339());
    println!("  Duration: {} seconds", stats.duration_seconds());
    println!();

    println!("Items:");
    println!("  Total URLs: {}", stats.total);
    println!("  Succeeded: {}", stats.ok);
    println!("  Failed: {}", stats.errors);
    println!("  Images downloaded: {}", stats.images_downloaded);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} URLs harvested)",
        stats.success_rate(),
        stats.ok,
        stats.total
    );
}
