use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::BankService;
use crate::domain::{
    Account, Customer, DormantWithLargeTransactions, Transaction, format_cents, format_timestamp,
};

/// Full copy of the three tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub customers: Vec<Customer>,
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

pub const DORMANT_REPORT_COLUMNS: [&str; 8] = [
    "account_id",
    "customer_id",
    "account_number",
    "last_transaction_date",
    "days_inactive",
    "largest_transaction_amount",
    "account_status",
    "current_balance",
];

/// Write dormant accounts with large past transactions as a CSV report.
/// Returns the number of rows written.
pub fn write_dormant_report<W: Write>(
    rows: &[DormantWithLargeTransactions],
    writer: W,
) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(DORMANT_REPORT_COLUMNS)?;

    for row in rows {
        let account = &row.dormant.account;
        let last_transaction = row
            .dormant
            .last_transaction
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_default();

        csv_writer.write_record([
            account.account_id.clone(),
            account.customer_id.clone(),
            account.account_number.clone(),
            last_transaction,
            row.dormant.days_inactive.to_string(),
            format_cents(row.largest_transaction_amount),
            account.status.as_str().to_string(),
            format_cents(account.balance),
        ])?;
    }

    csv_writer.flush()?;
    Ok(rows.len())
}

/// Write every table as one pretty-printed JSON document.
pub fn write_snapshot<W: Write>(
    service: &BankService,
    exported_at: DateTime<Utc>,
    mut writer: W,
) -> Result<LedgerSnapshot> {
    let store = service.store();
    let snapshot = LedgerSnapshot {
        version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at,
        customers: store.customers().to_vec(),
        accounts: store.accounts().to_vec(),
        transactions: store.transactions().to_vec(),
    };

    let json = serde_json::to_string_pretty(&snapshot)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(snapshot)
}
