mod account;
pub mod analytics;
mod customer;
mod fee_waiver;
pub mod money;
mod timestamp;
mod transaction;
mod validation;

pub use account::*;
pub use analytics::{DormantAccount, DormantWithLargeTransactions, SalaryDepositAccount};
pub use customer::*;
pub use fee_waiver::*;
pub use money::{
    BasisPoints, Cents, ParseCentsError, cents_from_units, format_cents, format_rate,
    parse_cents, parse_rate, percent_of, checked_total,
};
pub use timestamp::*;
pub use transaction::*;
pub use validation::*;
