use super::operation::Operation;
use crate::error::{LoadError, Result};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

/// Weighted set of operations a virtual user picks from on every cycle.
#[derive(Debug, Clone)]
pub struct TaskSet {
    tasks: Vec<(Operation, u32)>,
    index: WeightedIndex<u64>,
}

impl Default for TaskSet {
    fn default() -> Self {
        Self::new(vec![(Operation::Deposit, 1), (Operation::Withdraw, 1)])
            .unwrap_or_else(|e| unreachable!("default task weights are valid: {e}"))
    }
}

impl TaskSet {
    /// Creates a task set from `(operation, weight)` pairs.
    ///
    /// Fails when the set is empty or every weight is zero. Weights are summed
    /// as `u64`, so any combination of `u32` weights is accepted.
    pub fn new(tasks: Vec<(Operation, u32)>) -> Result<Self> {
        let index = WeightedIndex::new(tasks.iter().map(|(_, weight)| u64::from(*weight)))
            .map_err(|e| LoadError::Config(format!("Invalid task weights: {e}")))?;
        Ok(Self { tasks, index })
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Operation {
        self.tasks[self.index.sample(rng)].0
    }

    pub fn weight(&self, op: Operation) -> u64 {
        self.tasks
            .iter()
            .filter(|(candidate, _)| *candidate == op)
            .map(|(_, weight)| u64::from(*weight))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_rejects_empty_set() {
        assert!(matches!(TaskSet::new(vec![]), Err(LoadError::Config(_))));
    }

    #[test]
    fn test_rejects_all_zero_weights() {
        let result = TaskSet::new(vec![(Operation::Deposit, 0), (Operation::Withdraw, 0)]);
        assert!(matches!(result, Err(LoadError::Config(_))));
    }

    #[test]
    fn test_zero_weight_is_never_picked() {
        let tasks = TaskSet::new(vec![(Operation::Deposit, 0), (Operation::Withdraw, 3)]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1_000 {
            assert_eq!(tasks.pick(&mut rng), Operation::Withdraw);
        }
    }

    #[test]
    fn test_default_is_evenly_weighted() {
        let tasks = TaskSet::default();
        assert_eq!(tasks.weight(Operation::Deposit), 1);
        assert_eq!(tasks.weight(Operation::Withdraw), 1);

        let mut rng = StdRng::seed_from_u64(9);
        let deposits = (0..10_000)
            .filter(|_| tasks.pick(&mut rng) == Operation::Deposit)
            .count();
        assert!((4_500..=5_500).contains(&deposits), "deposits = {deposits}");
    }

    #[test]
    fn test_ratio_follows_weights() {
        let tasks = TaskSet::new(vec![(Operation::Deposit, 3), (Operation::Withdraw, 1)]).unwrap();
        let mut rng = StdRng::seed_from_u64(13);
        let deposits = (0..10_000)
            .filter(|_| tasks.pick(&mut rng) == Operation::Deposit)
            .count();
        assert!((7_000..=8_000).contains(&deposits), "deposits = {deposits}");
    }

    #[test]
    fn test_accepts_largest_weights() {
        let tasks =
            TaskSet::new(vec![(Operation::Deposit, u32::MAX), (Operation::Withdraw, 1)]).unwrap();
        assert_eq!(tasks.weight(Operation::Deposit), u64::from(u32::MAX));

        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..1_000 {
            assert_eq!(tasks.pick(&mut rng), Operation::Deposit);
        }

        let even = TaskSet::new(vec![(Operation::Deposit, u32::MAX), (Operation::Withdraw, u32::MAX)]);
        assert!(even.is_ok());
    }
}
