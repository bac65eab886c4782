use super::amount::{Amount, AmountRange};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A banking operation a virtual user can perform.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Deposit,
    Withdraw,
}

impl Operation {
    pub const ALL: [Operation; 2] = [Operation::Deposit, Operation::Withdraw];

    /// Endpoint path the operation is posted to.
    pub fn path(&self) -> &'static str {
        match self {
            Operation::Deposit => "/deposit",
            Operation::Withdraw => "/withdraw",
        }
    }

    pub fn default_amount_range(&self) -> AmountRange {
        let (min, max) = match self {
            Operation::Deposit => (dec!(10.00), dec!(1000.00)),
            Operation::Withdraw => (dec!(10.00), dec!(500.00)),
        };
        AmountRange::from_scaled(min, max)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// JSON body posted for both deposits and withdrawals.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct TransactionRequest {
    pub account_id: u32,
    pub amount: Amount,
}
