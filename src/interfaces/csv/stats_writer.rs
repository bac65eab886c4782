use crate::application::stats::{EndpointSummary, StatsReport};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct StatsRow<'a> {
    #[serde(rename = "Type")]
    method: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Request Count")]
    requests: u64,
    #[serde(rename = "Failure Count")]
    failures: u64,
    #[serde(rename = "Median Response Time")]
    median_ms: f64,
    #[serde(rename = "Average Response Time")]
    average_ms: f64,
    #[serde(rename = "Min Response Time")]
    min_ms: f64,
    #[serde(rename = "Max Response Time")]
    max_ms: f64,
    #[serde(rename = "Requests/s")]
    requests_per_sec: f64,
    #[serde(rename = "Failures/s")]
    failures_per_sec: f64,
    #[serde(rename = "95%")]
    p95_ms: f64,
}

impl<'a> From<&'a EndpointSummary> for StatsRow<'a> {
    fn from(summary: &'a EndpointSummary) -> Self {
        Self {
            method: &summary.method,
            name: &summary.name,
            requests: summary.requests,
            failures: summary.failures,
            median_ms: round2(summary.median_ms),
            average_ms: round2(summary.average_ms),
            min_ms: round2(summary.min_ms),
            max_ms: round2(summary.max_ms),
            requests_per_sec: round2(summary.requests_per_sec),
            failures_per_sec: round2(summary.failures_per_sec),
            p95_ms: round2(summary.p95_ms),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Writes a `StatsReport` as CSV: one row per endpoint, then the aggregated row.
pub struct StatsWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> StatsWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_report(&mut self, report: &StatsReport) -> Result<()> {
        for endpoint in &report.endpoints {
            self.writer.serialize(StatsRow::from(endpoint))?;
        }
        self.writer.serialize(StatsRow::from(&report.total))?;
        self.writer.flush()?;
        Ok(())
    }
}
