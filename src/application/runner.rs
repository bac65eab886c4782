use super::stats::{Outcome, RecordSender, RequestRecord, StatsAggregator, StatsReport};
use crate::config::LoadConfig;
use crate::domain::ports::BankClientRef;
use crate::domain::sampler::RequestSampler;
use crate::domain::task::TaskSet;
use crate::domain::wait::WaitTime;
use crate::error::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Stops a running load test from outside, e.g. on Ctrl-C.
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<watch::Sender<bool>>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.send_replace(true);
    }
}

/// Drives a swarm of virtual users against a `BankClient`.
///
/// Users are started at the configured spawn rate. The run ends when the run
/// time elapses, when every user has used up its iteration budget, or when a
/// `ShutdownHandle` fires. Requests already in flight are allowed to finish.
pub struct LoadRunner {
    config: LoadConfig,
    client: BankClientRef,
    stop: Arc<watch::Sender<bool>>,
}

impl LoadRunner {
    /// Creates a new `LoadRunner` instance.
    ///
    /// # Arguments
    ///
    /// * `config` - Users, ramp-up, stop conditions and task settings.
    /// * `client` - The bank API every user talks to.
    pub fn new(config: LoadConfig, client: BankClientRef) -> Result<Self> {
        config.validate()?;
        let (stop, _) = watch::channel(false);
        Ok(Self {
            config,
            client,
            stop: Arc::new(stop),
        })
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(self.stop.clone())
    }

    /// Runs the load test to completion and returns the collected statistics.
    pub async fn run(self) -> Result<StatsReport> {
        let started = Instant::now();
        let (records, aggregator) = StatsAggregator::spawn();

        info!(
            users = self.config.users,
            spawn_rate = self.config.spawn_rate,
            run_time = ?self.config.run_time,
            iterations = ?self.config.iterations,
            "Starting load test"
        );

        let mut swarm = tokio::spawn(swarm(
            self.config.clone(),
            self.client.clone(),
            records,
            self.stop.subscribe(),
        ));

        let deadline = async {
            match self.config.run_time {
                Some(run_time) => tokio::time::sleep(run_time).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        tokio::select! {
            result = &mut swarm => result?,
            _ = &mut deadline => {
                info!("Run time elapsed, stopping users");
                self.stop.send_replace(true);
                swarm.await?;
            }
        }

        let aggregator = aggregator.await?;
        let elapsed = started.elapsed();
        info!(
            requests = aggregator.request_count(),
            elapsed = ?elapsed,
            "Load test finished"
        );
        Ok(aggregator.report(elapsed))
    }
}

/// Spawns users at the configured rate, then waits for all of them.
async fn swarm(
    config: LoadConfig,
    client: BankClientRef,
    records: RecordSender,
    mut stop: watch::Receiver<bool>,
) {
    let interval = config.spawn_interval();
    let mut users = JoinSet::new();

    for id in 0..config.users {
        if *stop.borrow() {
            break;
        }
        if id > 0 {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = stop.wait_for(|stopped| *stopped) => break,
            }
        }
        let user = VirtualUser::new(id, &config, client.clone(), records.clone(), stop.clone());
        users.spawn(user.run());
        debug!(user = id, "User spawned");
    }
    info!(users = users.len(), "Ramp-up complete");
    drop(records);

    while let Some(result) = users.join_next().await {
        if let Err(e) = result {
            warn!("Virtual user aborted: {}", e);
        }
    }
}

/// A simulated client performing weighted tasks in a loop.
struct VirtualUser {
    id: usize,
    rng: StdRng,
    tasks: TaskSet,
    sampler: RequestSampler,
    wait: WaitTime,
    iterations: Option<u64>,
    client: BankClientRef,
    records: RecordSender,
    stop: watch::Receiver<bool>,
}

impl VirtualUser {
    fn new(
        id: usize,
        config: &LoadConfig,
        client: BankClientRef,
        records: RecordSender,
        stop: watch::Receiver<bool>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => StdRng::from_entropy(),
        };
        Self {
            id,
            rng,
            tasks: config.tasks.clone(),
            sampler: config.sampler.clone(),
            wait: config.wait,
            iterations: config.iterations,
            client,
            records,
            stop,
        }
    }

    async fn run(mut self) {
        let mut completed = 0u64;
        loop {
            if *self.stop.borrow() {
                break;
            }

            let operation = self.tasks.pick(&mut self.rng);
            let request = self.sampler.sample(operation, &mut self.rng);

            let sent_at = Instant::now();
            let outcome = match self.client.submit(operation, &request).await {
                Ok(response) if response.is_success() => Outcome::Success {
                    status: response.status,
                },
                Ok(response) => Outcome::Failure {
                    reason: format!("HTTP {}", response.status),
                },
                Err(e) => Outcome::Failure {
                    reason: e.to_string(),
                },
            };
            let latency = sent_at.elapsed();

            if let Outcome::Failure { reason } = &outcome {
                debug!(user = self.id, %operation, account_id = request.account_id, "Request failed: {}", reason);
            }

            let record = RequestRecord {
                operation,
                latency,
                outcome,
            };
            if self.records.send(record).is_err() {
                break;
            }

            completed += 1;
            if self.iterations.is_some_and(|limit| completed >= limit) {
                break;
            }

            let pause = self.wait.sample(&mut self.rng);
            if !pause.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(pause) => {}
                    _ = self.stop.wait_for(|stopped| *stopped) => break,
                }
            }
        }
        debug!(user = self.id, completed, "User stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::operation::Operation;
    use crate::infrastructure::recording::RecordingBankClient;
    use std::time::Duration;

    fn quick_config(users: usize, iterations: u64) -> LoadConfig {
        LoadConfig {
            users,
            spawn_rate: 1_000.0,
            iterations: Some(iterations),
            wait: WaitTime::Constant(Duration::ZERO),
            seed: Some(42),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_iteration_budget_is_exact() {
        let client = RecordingBankClient::new();
        let runner = LoadRunner::new(quick_config(4, 25), Arc::new(client.clone())).unwrap();

        let report = runner.run().await.unwrap();

        assert_eq!(report.total.requests, 100);
        assert_eq!(report.total.failures, 0);
        assert_eq!(client.len().await, 100);
    }

    #[tokio::test]
    async fn test_non_success_status_counts_as_failure() {
        let client = RecordingBankClient::with_status(500);
        let runner = LoadRunner::new(quick_config(1, 10), Arc::new(client)).unwrap();

        let report = runner.run().await.unwrap();

        assert_eq!(report.total.requests, 10);
        assert_eq!(report.total.failures, 10);
        assert!(report.errors.iter().all(|e| e.reason == "HTTP 500"));
    }

    #[tokio::test]
    async fn test_same_seed_same_requests() {
        let first = RecordingBankClient::new();
        LoadRunner::new(quick_config(1, 50), Arc::new(first.clone()))
            .unwrap()
            .run()
            .await
            .unwrap();

        let second = RecordingBankClient::new();
        LoadRunner::new(quick_config(1, 50), Arc::new(second.clone()))
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(first.requests().await, second.requests().await);
    }

    #[tokio::test]
    async fn test_zero_weight_operation_is_never_sent() {
        let client = RecordingBankClient::new();
        let config = LoadConfig {
            tasks: TaskSet::new(vec![(Operation::Deposit, 1), (Operation::Withdraw, 0)]).unwrap(),
            ..quick_config(2, 20)
        };
        LoadRunner::new(config, Arc::new(client.clone()))
            .unwrap()
            .run()
            .await
            .unwrap();

        let sent = client.requests().await;
        assert_eq!(sent.len(), 40);
        assert!(sent.iter().all(|(op, _)| *op == Operation::Deposit));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_time_stops_unbounded_users() {
        let client = RecordingBankClient::new();
        let config = LoadConfig {
            users: 2,
            spawn_rate: 10.0,
            run_time: Some(Duration::from_secs(10)),
            wait: WaitTime::Constant(Duration::from_secs(1)),
            ..Default::default()
        };
        let report = LoadRunner::new(config, Arc::new(client))
            .unwrap()
            .run()
            .await
            .unwrap();

        // One request per second per user, give or take the boundaries.
        assert!(
            (18..=22).contains(&report.total.requests),
            "requests = {}",
            report.total.requests
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_users_start_at_spawn_rate() {
        let ramp = |spawn_rate: f64| LoadConfig {
            users: 3,
            spawn_rate,
            run_time: Some(Duration::from_millis(1_500)),
            wait: WaitTime::Constant(Duration::from_secs(10)),
            ..Default::default()
        };

        // One user per second: users start at 0s and 1s, the third is cut off.
        let client = RecordingBankClient::new();
        let report = LoadRunner::new(ramp(1.0), Arc::new(client.clone()))
            .unwrap()
            .run()
            .await
            .unwrap();
        assert_eq!(report.total.requests, 2);
        assert_eq!(client.len().await, 2);

        // Two users per second: all three are up by 1s.
        let report = LoadRunner::new(ramp(2.0), Arc::new(RecordingBankClient::new()))
            .unwrap()
            .run()
            .await
            .unwrap();
        assert_eq!(report.total.requests, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_handle_stops_run() {
        let client = RecordingBankClient::new();
        let config = LoadConfig {
            users: 3,
            spawn_rate: 100.0,
            wait: WaitTime::Constant(Duration::from_secs(5)),
            ..Default::default()
        };
        let runner = LoadRunner::new(config, Arc::new(client.clone())).unwrap();
        let handle = runner.shutdown_handle();

        let run = tokio::spawn(runner.run());
        tokio::time::sleep(Duration::from_secs(12)).await;
        handle.shutdown();

        let report = run.await.unwrap().unwrap();
        assert_eq!(report.total.requests, 9);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = LoadConfig {
            users: 0,
            ..Default::default()
        };
        assert!(LoadRunner::new(config, Arc::new(RecordingBankClient::new())).is_err());
    }
}
