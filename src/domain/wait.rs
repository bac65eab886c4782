use crate::error::{LoadError, Result};
use rand::Rng;
use std::time::Duration;

/// Pause a virtual user takes between two tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTime {
    Constant(Duration),
    Between { min: Duration, max: Duration },
}

impl Default for WaitTime {
    fn default() -> Self {
        WaitTime::Between {
            min: Duration::from_secs(1),
            max: Duration::from_secs(3),
        }
    }
}

impl WaitTime {
    pub fn between(min: Duration, max: Duration) -> Result<Self> {
        if min > max {
            return Err(LoadError::Config(format!(
                "Minimum wait {min:?} exceeds maximum wait {max:?}"
            )));
        }
        if min == max {
            return Ok(WaitTime::Constant(min));
        }
        Ok(WaitTime::Between { min, max })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        match *self {
            WaitTime::Constant(wait) => wait,
            WaitTime::Between { min, max } => rng.gen_range(min..=max),
        }
    }
}
