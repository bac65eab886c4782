use crate::config::SeedConfig;
use crate::domain::amount::{AMOUNT_SCALE, AmountRange};
use crate::error::Result;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::io::Write;
use tracing::{debug, info};

/// Highest initial balance, in cents.
const MAX_BALANCE_CENTS: i64 = 1_000_000;

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SeedTransactionType {
    Deposit,
    Withdrawal,
}

#[derive(Debug, Serialize)]
struct AccountRow {
    id: u32,
    account_number: String,
    balance: Decimal,
}

#[derive(Debug, Serialize)]
struct TransactionRow {
    account_id: u32,
    amount: Decimal,
    transaction_type: SeedTransactionType,
}

/// Row counts written by a `SeedWriter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub accounts: u64,
    pub transactions: u64,
}

/// Generates seed data for the bank under test as two CSV streams.
///
/// Accounts are numbered `ACC0001`, `ACC0002`, ... with ids starting at 1, so
/// they line up with the account ids the load test samples. Each account gets
/// a random initial balance and a batch of random deposits and withdrawals.
pub struct SeedWriter<A: Write, T: Write> {
    accounts: csv::Writer<A>,
    transactions: csv::Writer<T>,
}

impl<A: Write, T: Write> SeedWriter<A, T> {
    pub fn new(accounts: A, transactions: T) -> Self {
        Self {
            accounts: csv::Writer::from_writer(accounts),
            transactions: csv::Writer::from_writer(transactions),
        }
    }

    pub fn write<R: Rng + ?Sized>(&mut self, config: &SeedConfig, rng: &mut R) -> Result<SeedSummary> {
        config.validate()?;
        let amounts = AmountRange::new(dec!(0.01), dec!(1000.00))?;
        let mut summary = SeedSummary {
            accounts: 0,
            transactions: 0,
        };

        for id in 1..=config.accounts {
            let balance = Decimal::new(rng.gen_range(0..=MAX_BALANCE_CENTS), AMOUNT_SCALE);
            self.accounts.serialize(AccountRow {
                id,
                account_number: account_number(id),
                balance,
            })?;
            summary.accounts += 1;

            for _ in 0..config.transactions_per_account {
                let transaction_type = if rng.gen_bool(0.5) {
                    SeedTransactionType::Deposit
                } else {
                    SeedTransactionType::Withdrawal
                };
                self.transactions.serialize(TransactionRow {
                    account_id: id,
                    amount: amounts.sample(rng).value(),
                    transaction_type,
                })?;
            }
            summary.transactions += u64::from(config.transactions_per_account);
            debug!(account = %account_number(id), "Account seeded");
        }

        self.accounts.flush()?;
        self.transactions.flush()?;
        info!(
            accounts = summary.accounts,
            transactions = summary.transactions,
            "Seed data written"
        );
        Ok(summary)
    }
}

pub fn account_number(id: u32) -> String {
    format!("ACC{id:04}")
}
