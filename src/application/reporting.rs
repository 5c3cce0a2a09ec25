use serde::{Deserialize, Serialize};

use crate::domain::{Account, Cents, Customer, Transaction};

/// A customer with every account they own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer: Customer,
    pub accounts: Vec<Account>,
    #[serde(with = "crate::domain::money::cents_str")]
    pub total_balance: Cents,
    pub account_count: usize,
}

/// An account with its full ledger history in scan order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    pub account: Account,
    pub transactions: Vec<Transaction>,
    pub transaction_count: usize,
    #[serde(with = "crate::domain::money::cents_str")]
    pub current_balance: Cents,
}

/// Fees charged to an account, used to build a fee waiver request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    #[serde(with = "crate::domain::money::cents_str")]
    pub annual_fee: Cents,
    #[serde(with = "crate::domain::money::cents_str")]
    pub monthly_fee: Cents,
    pub premium: bool,
}
