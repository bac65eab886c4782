use super::amount::AmountRange;
use super::operation::{Operation, TransactionRequest};
use crate::error::{LoadError, Result};
use rand::Rng;
use std::ops::RangeInclusive;

pub const DEFAULT_ACCOUNTS: RangeInclusive<u32> = 1..=100;

/// Generates the random payload for each operation.
///
/// Account ids are drawn uniformly from an inclusive range shared by all
/// operations; amounts come from the operation's own `AmountRange`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSampler {
    accounts: RangeInclusive<u32>,
    deposit: AmountRange,
    withdraw: AmountRange,
}

impl Default for RequestSampler {
    fn default() -> Self {
        Self {
            accounts: DEFAULT_ACCOUNTS,
            deposit: Operation::Deposit.default_amount_range(),
            withdraw: Operation::Withdraw.default_amount_range(),
        }
    }
}

impl RequestSampler {
    pub fn new(
        accounts: RangeInclusive<u32>,
        deposit: AmountRange,
        withdraw: AmountRange,
    ) -> Result<Self> {
        if accounts.is_empty() || *accounts.start() == 0 {
            return Err(LoadError::Validation(format!(
                "Account range {}..={} must be non-empty and start at 1 or above",
                accounts.start(),
                accounts.end()
            )));
        }
        Ok(Self {
            accounts,
            deposit,
            withdraw,
        })
    }

    pub fn accounts(&self) -> &RangeInclusive<u32> {
        &self.accounts
    }

    pub fn amount_range(&self, op: Operation) -> &AmountRange {
        match op {
            Operation::Deposit => &self.deposit,
            Operation::Withdraw => &self.withdraw,
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, op: Operation, rng: &mut R) -> TransactionRequest {
        TransactionRequest {
            account_id: rng.gen_range(self.accounts.clone()),
            amount: self.amount_range(op).sample(rng),
        }
    }

    pub fn deposit<R: Rng + ?Sized>(&self, rng: &mut R) -> TransactionRequest {
        self.sample(Operation::Deposit, rng)
    }

    pub fn withdraw<R: Rng + ?Sized>(&self, rng: &mut R) -> TransactionRequest {
        self.sample(Operation::Withdraw, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rejects_zero_account_id() {
        let range = AmountRange::new(dec!(1.00), dec!(2.00)).unwrap();
        assert!(matches!(
            RequestSampler::new(0..=10, range, range),
            Err(LoadError::Validation(_))
        ));
    }

    #[test]
    #[allow(clippy::reversed_empty_ranges)]
    fn test_rejects_empty_account_range() {
        let range = AmountRange::new(dec!(1.00), dec!(2.00)).unwrap();
        assert!(RequestSampler::new(10..=1, range, range).is_err());
    }

    #[test]
    fn test_custom_ranges_are_used() {
        let deposit = AmountRange::new(dec!(5.00), dec!(5.00)).unwrap();
        let withdraw = AmountRange::new(dec!(7.25), dec!(7.25)).unwrap();
        let sampler = RequestSampler::new(3..=3, deposit, withdraw).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let d = sampler.deposit(&mut rng);
        assert_eq!(d.account_id, 3);
        assert_eq!(d.amount.value(), dec!(5.00));

        let w = sampler.withdraw(&mut rng);
        assert_eq!(w.account_id, 3);
        assert_eq!(w.amount.value(), dec!(7.25));
    }

    #[test]
    fn test_account_ids_cover_range() {
        let sampler = RequestSampler::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..5_000 {
            seen.insert(sampler.deposit(&mut rng).account_id);
        }
        assert_eq!(seen.len(), 100);
        assert!(seen.contains(&1));
        assert!(seen.contains(&100));
    }
}
