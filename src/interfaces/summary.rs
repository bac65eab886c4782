use crate::application::stats::{EndpointSummary, StatsReport};
use std::io::{self, Write};

/// Renders a `StatsReport` as an aligned text table.
pub struct SummaryTable;

impl SummaryTable {
    pub fn render<W: Write>(report: &StatsReport, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "{:<6} {:<12} {:>8} {:>16} | {:>8} {:>8} {:>8} {:>8} {:>8} | {:>8} {:>10}",
            "Type", "Name", "# reqs", "# fails", "Avg", "Min", "Max", "Med", "95%", "req/s", "failures/s"
        )?;
        writeln!(out, "{}", "-".repeat(118))?;
        for endpoint in &report.endpoints {
            Self::row(endpoint, out)?;
        }
        writeln!(out, "{}", "-".repeat(118))?;
        Self::row(&report.total, out)?;

        if !report.errors.is_empty() {
            writeln!(out)?;
            writeln!(out, "Error report")?;
            writeln!(out, "{:>12} | {:<12} | Reason", "# occurrences", "Name")?;
            for error in &report.errors {
                writeln!(out, "{:>12} | {:<12} | {}", error.occurrences, error.name, error.reason)?;
            }
        }
        Ok(())
    }

    fn row<W: Write>(e: &EndpointSummary, out: &mut W) -> io::Result<()> {
        let fail_ratio = if e.requests == 0 {
            0.0
        } else {
            e.failures as f64 * 100.0 / e.requests as f64
        };
        writeln!(
            out,
            "{:<6} {:<12} {:>8} {:>16} | {:>8.0} {:>8.0} {:>8.0} {:>8.0} {:>8.0} | {:>8.2} {:>10.2}",
            e.method,
            e.name,
            e.requests,
            format!("{}({:.2}%)", e.failures, fail_ratio),
            e.average_ms,
            e.min_ms,
            e.max_ms,
            e.median_ms,
            e.p95_ms,
            e.requests_per_sec,
            e.failures_per_sec,
        )
    }
}
