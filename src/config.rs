use crate::domain::sampler::RequestSampler;
use crate::domain::task::TaskSet;
use crate::domain::wait::WaitTime;
use crate::error::{LoadError, Result};
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for a single load run.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Number of concurrent virtual users.
    pub users: usize,
    /// Virtual users started per second during ramp-up.
    pub spawn_rate: f64,
    /// Stop after this much wall-clock time.
    pub run_time: Option<Duration>,
    /// Stop each user after this many tasks.
    pub iterations: Option<u64>,
    pub wait: WaitTime,
    pub tasks: TaskSet,
    pub sampler: RequestSampler,
    /// Base seed for per-user RNGs. Random when absent.
    pub seed: Option<u64>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            users: 1,
            spawn_rate: 1.0,
            run_time: None,
            iterations: None,
            wait: WaitTime::default(),
            tasks: TaskSet::default(),
            sampler: RequestSampler::default(),
            seed: None,
        }
    }
}

impl LoadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.users == 0 {
            return Err(LoadError::Config(
                "At least one user is required".to_string(),
            ));
        }
        if !self.spawn_rate.is_finite() || self.spawn_rate <= 0.0 {
            return Err(LoadError::Config(format!(
                "Spawn rate must be a positive number, got {}",
                self.spawn_rate
            )));
        }
        if self.run_time == Some(Duration::ZERO) {
            return Err(LoadError::Config("Run time must be non-zero".to_string()));
        }
        if self.iterations == Some(0) {
            return Err(LoadError::Config(
                "Iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Delay between two consecutive user starts.
    pub fn spawn_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.spawn_rate).unwrap_or(Duration::MAX)
    }
}

/// Settings for the seed-data generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    pub accounts: u32,
    pub transactions_per_account: u32,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            accounts: 100,
            transactions_per_account: 500,
        }
    }
}

impl SeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.accounts == 0 {
            return Err(LoadError::Config(
                "At least one account is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parses durations such as `90`, `45s`, `2m`, `1h30m` or `1h2m3s`.
///
/// A bare number is read as seconds.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(LoadError::Config("Empty duration".to_string()));
    }
    if let Ok(secs) = input.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let invalid = || LoadError::Config(format!("Invalid duration '{input}'"));
    let mut total = 0u64;
    let mut digits = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let value: u64 = digits.parse().map_err(|_| invalid())?;
        digits.clear();
        let unit = match c {
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            _ => return Err(invalid()),
        };
        total = value
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(invalid)?;
    }
    if !digits.is_empty() {
        return Err(invalid());
    }
    Ok(Duration::from_secs(total))
}

/// Parses a non-negative number of seconds, fractions allowed.
pub fn parse_seconds(input: &str) -> Result<Duration> {
    let secs: f64 = input
        .trim()
        .parse()
        .map_err(|_| LoadError::Config(format!("Invalid number of seconds '{input}'")))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|e| LoadError::Config(format!("Invalid number of seconds '{input}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LoadConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_users = LoadConfig {
            users: 0,
            ..Default::default()
        };
        assert!(matches!(zero_users.validate(), Err(LoadError::Config(_))));

        let bad_rate = LoadConfig {
            spawn_rate: 0.0,
            ..Default::default()
        };
        assert!(bad_rate.validate().is_err());

        let nan_rate = LoadConfig {
            spawn_rate: f64::NAN,
            ..Default::default()
        };
        assert!(nan_rate.validate().is_err());

        let zero_iterations = LoadConfig {
            iterations: Some(0),
            ..Default::default()
        };
        assert!(zero_iterations.validate().is_err());
    }

    #[test]
    fn test_seed_config_validation() {
        assert!(SeedConfig::default().validate().is_ok());
        let empty = SeedConfig {
            accounts: 0,
            ..Default::default()
        };
        assert!(matches!(empty.validate(), Err(LoadError::Config(_))));
    }

    #[test]
    fn test_spawn_interval() {
        let config = LoadConfig {
            spawn_rate: 4.0,
            ..Default::default()
        };
        assert_eq!(config.spawn_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("90").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5_400));
        assert_eq!(parse_duration("1h2m3s").unwrap(), Duration::from_secs(3_723));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("1h30").is_err());
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("1.5").unwrap(), Duration::from_millis(1_500));
        assert_eq!(parse_seconds("0").unwrap(), Duration::ZERO);
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("soon").is_err());
    }
}
