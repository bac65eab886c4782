use crate::domain::operation::Operation;
use hdrhistogram::Histogram;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub const TOTAL_ROW: &str = "Aggregated";

/// How a single request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { status: u16 },
    Failure { reason: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure { .. })
    }
}

/// One completed request, sent by a virtual user to the aggregator.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub operation: Operation,
    pub latency: Duration,
    pub outcome: Outcome,
}

pub type RecordSender = mpsc::UnboundedSender<RequestRecord>;

/// Significant figures kept by the latency histograms.
const LATENCY_SIGFIG: u8 = 3;

/// Counters of one endpoint, or of the whole run.
///
/// Latencies are recorded in microseconds into an auto-resizing histogram, so
/// memory stays bounded however long the run lasts.
#[derive(Debug, Clone)]
struct EndpointStats {
    latencies: Histogram<u64>,
    total_micros: u128,
    failures: u64,
}

impl Default for EndpointStats {
    fn default() -> Self {
        let latencies = Histogram::new(LATENCY_SIGFIG)
            .unwrap_or_else(|e| unreachable!("latency histogram precision is valid: {e}"));
        Self {
            latencies,
            total_micros: 0,
            failures: 0,
        }
    }
}

impl EndpointStats {
    fn record(&mut self, latency: Duration, failed: bool) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.latencies.saturating_record(micros);
        self.total_micros += u128::from(micros);
        if failed {
            self.failures += 1;
        }
    }

    fn requests(&self) -> u64 {
        self.latencies.len()
    }

    /// Nearest-rank quantile, reported as the lower bound of its bucket.
    fn quantile_ms(&self, quantile: f64) -> f64 {
        if self.requests() == 0 {
            return 0.0;
        }
        let micros = self
            .latencies
            .lowest_equivalent(self.latencies.value_at_quantile(quantile));
        to_ms(micros)
    }

    fn summarize(&self, name: &str, elapsed: Duration) -> EndpointSummary {
        let requests = self.requests();
        let secs = elapsed.as_secs_f64();
        let per_second = |count: u64| {
            if secs > 0.0 {
                count as f64 / secs
            } else {
                0.0
            }
        };
        let (average_ms, min_ms, max_ms) = if requests == 0 {
            (0.0, 0.0, 0.0)
        } else {
            (
                self.total_micros as f64 / requests as f64 / 1_000.0,
                to_ms(self.latencies.min()),
                to_ms(self.latencies.lowest_equivalent(self.latencies.max())),
            )
        };

        EndpointSummary {
            method: "POST".to_string(),
            name: name.to_string(),
            requests,
            failures: self.failures,
            median_ms: self.quantile_ms(0.50),
            average_ms,
            min_ms,
            max_ms,
            p95_ms: self.quantile_ms(0.95),
            requests_per_sec: per_second(requests),
            failures_per_sec: per_second(self.failures),
        }
    }
}

fn to_ms(micros: u64) -> f64 {
    micros as f64 / 1_000.0
}

/// Per-endpoint figures of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointSummary {
    pub method: String,
    pub name: String,
    pub requests: u64,
    pub failures: u64,
    pub median_ms: f64,
    pub average_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p95_ms: f64,
    pub requests_per_sec: f64,
    pub failures_per_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub name: String,
    pub reason: String,
    pub occurrences: u64,
}

/// Final statistics of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub elapsed_secs: f64,
    pub endpoints: Vec<EndpointSummary>,
    pub total: EndpointSummary,
    pub errors: Vec<ErrorSummary>,
}

impl StatsReport {
    pub fn endpoint(&self, op: Operation) -> Option<&EndpointSummary> {
        self.endpoints.iter().find(|e| e.name == op.path())
    }
}

/// Owns every counter of a run.
///
/// Runs as a single task fed through an unbounded channel, so virtual users
/// never contend on a lock.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    endpoints: BTreeMap<Operation, EndpointStats>,
    total: EndpointStats,
    errors: BTreeMap<(Operation, String), u64>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns the aggregator task.
    ///
    /// The task finishes once every sender has been dropped and hands back the
    /// aggregator with all records applied.
    pub fn spawn() -> (RecordSender, JoinHandle<StatsAggregator>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<RequestRecord>();
        let handle = tokio::spawn(async move {
            let mut aggregator = StatsAggregator::new();
            while let Some(record) = rx.recv().await {
                aggregator.record(record);
            }
            debug!(requests = aggregator.request_count(), "Stats channel closed");
            aggregator
        });
        (tx, handle)
    }

    pub fn record(&mut self, record: RequestRecord) {
        let failed = record.outcome.is_failure();
        self.endpoints
            .entry(record.operation)
            .or_default()
            .record(record.latency, failed);
        self.total.record(record.latency, failed);
        if let Outcome::Failure { reason } = record.outcome {
            *self.errors.entry((record.operation, reason)).or_insert(0) += 1;
        }
    }

    pub fn request_count(&self) -> u64 {
        self.total.requests()
    }

    pub fn report(&self, elapsed: Duration) -> StatsReport {
        let endpoints = self
            .endpoints
            .iter()
            .map(|(op, stats)| stats.summarize(op.path(), elapsed))
            .collect();

        let errors = self
            .errors
            .iter()
            .map(|((op, reason), occurrences)| ErrorSummary {
                name: op.path().to_string(),
                reason: reason.clone(),
                occurrences: *occurrences,
            })
            .collect();

        let mut total = self.total.summarize(TOTAL_ROW, elapsed);
        total.method = String::new();

        StatsReport {
            elapsed_secs: elapsed.as_secs_f64(),
            endpoints,
            total,
            errors,
        }
    }
}
