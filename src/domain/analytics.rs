//! Analytical queries over loaded tables.
//!
//! Every function here is pure: it takes the account and ledger slices plus an
//! explicit `now`, and returns owned results in account scan order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Account, Cents, Transaction};

/// An open account with no activity inside the trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DormantAccount {
    #[serde(flatten)]
    pub account: Account,
    /// Most recent ledger entry, `None` when the account never transacted
    pub last_transaction: Option<DateTime<Utc>>,
    /// Last transaction, or the opening date when there is none
    pub last_activity: DateTime<Utc>,
    pub days_inactive: i64,
}

/// A dormant account plus the historical transactions that crossed the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DormantWithLargeTransactions {
    #[serde(flatten)]
    pub dormant: DormantAccount,
    #[serde(with = "super::money::cents_str")]
    pub largest_transaction_amount: Cents,
    pub large_transactions: Vec<Transaction>,
}

/// An account that received at least one qualifying credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryDepositAccount {
    #[serde(flatten)]
    pub account: Account,
    pub deposit_count: usize,
    #[serde(with = "super::money::cents_str")]
    pub max_deposit: Cents,
    pub deposits: Vec<Transaction>,
}

/// Group ledger entries by account, keeping ledger order inside each group.
pub fn transactions_by_account(transactions: &[Transaction]) -> HashMap<&str, Vec<&Transaction>> {
    let mut grouped: HashMap<&str, Vec<&Transaction>> = HashMap::new();
    for tx in transactions {
        grouped.entry(tx.account_id.as_str()).or_default().push(tx);
    }
    grouped
}

/// Whole days elapsed between `since` and `now` (floored).
pub fn days_between(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_days()
}

fn latest_timestamp(transactions: &[&Transaction]) -> Option<DateTime<Utc>> {
    transactions.iter().map(|tx| tx.timestamp).max()
}

/// ACTIVE and FROZEN accounts whose last activity is at least `days_inactive`
/// days before `now`.
///
/// Accounts that never transacted are always reported; their age is measured
/// from the opening date. Results are ordered by account id.
pub fn dormant_accounts(
    accounts: &[Account],
    transactions: &[Transaction],
    days_inactive: u32,
    now: DateTime<Utc>,
) -> Vec<DormantAccount> {
    let by_account = transactions_by_account(transactions);
    dormant_with_index(accounts, &by_account, days_inactive, now)
}

fn dormant_with_index(
    accounts: &[Account],
    by_account: &HashMap<&str, Vec<&Transaction>>,
    days_inactive: u32,
    now: DateTime<Utc>,
) -> Vec<DormantAccount> {
    let threshold = i64::from(days_inactive);

    let mut dormant = accounts
        .iter()
        .filter(|account| account.status.is_open())
        .filter_map(|account| {
            let last_transaction = by_account
                .get(account.account_id.as_str())
                .and_then(|txs| latest_timestamp(txs));

            let last_activity = last_transaction.unwrap_or(account.opened_date);
            let days = days_between(last_activity, now);

            let qualifies = match last_transaction {
                None => true,
                Some(_) => days >= threshold,
            };

            qualifies.then(|| DormantAccount {
                account: account.clone(),
                last_transaction,
                last_activity,
                days_inactive: days,
            })
        })
        .collect::<Vec<_>>();

    dormant.sort_by(|a, b| a.account.account_id.cmp(&b.account.account_id));
    dormant
}

/// Dormant accounts that, at any point in their history, had a transaction
/// whose absolute amount is at least `threshold`.
pub fn dormant_with_large_transactions(
    accounts: &[Account],
    transactions: &[Transaction],
    days_inactive: u32,
    threshold: Cents,
    now: DateTime<Utc>,
) -> Vec<DormantWithLargeTransactions> {
    let by_account = transactions_by_account(transactions);

    dormant_with_index(accounts, &by_account, days_inactive, now)
        .into_iter()
        .filter_map(|dormant| {
            let history = by_account.get(dormant.account.account_id.as_str())?;
            let large: Vec<Transaction> = history
                .iter()
                .filter(|tx| tx.amount.saturating_abs() >= threshold)
                .map(|tx| (*tx).clone())
                .collect();

            let largest = large.iter().map(|tx| tx.amount.saturating_abs()).max()?;

            Some(DormantWithLargeTransactions {
                dormant,
                largest_transaction_amount: largest,
                large_transactions: large,
            })
        })
        .collect()
}

/// Accounts with at least one CREDIT of `min_amount` or more.
///
/// Descriptions are not inspected: any qualifying credit counts as a deposit.
pub fn salary_deposit_accounts(
    accounts: &[Account],
    transactions: &[Transaction],
    min_amount: Cents,
) -> Vec<SalaryDepositAccount> {
    let by_account = transactions_by_account(transactions);

    accounts
        .iter()
        .filter_map(|account| {
            let deposits: Vec<Transaction> = by_account
                .get(account.account_id.as_str())?
                .iter()
                .filter(|tx| tx.is_credit() && tx.amount >= min_amount)
                .map(|tx| (*tx).clone())
                .collect();

            let max_deposit = deposits.iter().map(|tx| tx.amount).max()?;

            Some(SalaryDepositAccount {
                account: account.clone(),
                deposit_count: deposits.len(),
                max_deposit,
                deposits,
            })
        })
        .collect()
}

/// Accounts with balance of at least `min_balance`, highest first.
/// Equal balances keep their scan order.
pub fn high_balance_accounts(accounts: &[Account], min_balance: Cents) -> Vec<Account> {
    let mut matches: Vec<Account> = accounts
        .iter()
        .filter(|account| account.balance >= min_balance)
        .cloned()
        .collect();

    // sort_by is stable
    matches.sort_by(|a, b| b.balance.cmp(&a.balance));
    matches
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::{AccountStatus, AccountType, TransactionType};

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn account(id: &str, balance: Cents, opened: DateTime<Utc>) -> Account {
        Account::new(id, "C0001", AccountType::Checking, "USD", balance).with_opened_date(opened)
    }

    fn tx(id: &str, account: &str, kind: TransactionType, amount: Cents, at: DateTime<Utc>) -> Transaction {
        Transaction::new(id, account, kind, amount, 0, at)
    }

    #[test]
    fn test_dormant_uses_latest_transaction() {
        let accounts = vec![account("A007", 0, date(2023, 1, 1))];
        let ledger = vec![
            tx("T1", "A007", TransactionType::Credit, 500, date(2023, 1, 2)),
            tx("T2", "A007", TransactionType::Debit, 100, date(2023, 1, 5)),
        ];

        let now = date(2023, 7, 5);
        let dormant = dormant_accounts(&accounts, &ledger, 180, now);
        assert_eq!(dormant.len(), 1);
        assert_eq!(dormant[0].last_transaction, Some(date(2023, 1, 5)));
        assert_eq!(dormant[0].days_inactive, 181);

        // One day short of the window
        let recent = dormant_accounts(&accounts, &ledger, 182, now);
        assert!(recent.is_empty());
    }

    #[test]
    fn test_dormant_boundary_is_inclusive() {
        let accounts = vec![account("A1", 0, date(2023, 1, 1))];
        let ledger = vec![tx("T1", "A1", TransactionType::Credit, 500, date(2023, 1, 1))];
        let now = date(2023, 1, 1) + Duration::days(30);

        assert_eq!(dormant_accounts(&accounts, &ledger, 30, now).len(), 1);
        assert!(dormant_accounts(&accounts, &ledger, 31, now).is_empty());
    }

    #[test]
    fn test_accounts_without_transactions_are_always_dormant() {
        let now = date(2024, 1, 1);
        let accounts = vec![account("A1", 0, now - Duration::days(3))];

        for days in [0, 1, 3, 365, u32::MAX] {
            let dormant = dormant_accounts(&accounts, &[], days, now);
            assert_eq!(dormant.len(), 1, "days = {}", days);
            assert_eq!(dormant[0].last_transaction, None);
            assert_eq!(dormant[0].days_inactive, 3);
        }
    }

    #[test]
    fn test_closed_accounts_are_never_dormant() {
        let now = date(2024, 1, 1);
        let accounts = vec![
            account("A1", 0, date(2020, 1, 1)).with_status(AccountStatus::Closed),
            account("A2", 0, date(2020, 1, 1)).with_status(AccountStatus::Frozen),
        ];

        let dormant = dormant_accounts(&accounts, &[], 30, now);
        let ids: Vec<&str> = dormant.iter().map(|d| d.account.account_id.as_str()).collect();
        assert_eq!(ids, vec!["A2"]);
    }

    #[test]
    fn test_dormant_results_ordered_by_account_id() {
        let now = date(2024, 1, 1);
        let accounts = vec![
            account("A00003", 0, date(2022, 1, 1)),
            account("A00010", 0, date(2022, 1, 1)),
            account("A00001", 0, date(2022, 1, 1)),
        ];

        let ids: Vec<String> = dormant_accounts(&accounts, &[], 180, now)
            .into_iter()
            .map(|d| d.account.account_id)
            .collect();
        assert_eq!(ids, vec!["A00001", "A00003", "A00010"]);
    }

    #[test]
    fn test_dormant_with_large_transactions_threshold() {
        let now = date(2024, 1, 1);
        let accounts = vec![account("A1", 0, date(2022, 1, 1))];
        let ledger = vec![
            tx("T1", "A1", TransactionType::Credit, 150000, date(2022, 3, 1)),
            tx("T2", "A1", TransactionType::Debit, 2000, date(2022, 4, 1)),
        ];

        let found = dormant_with_large_transactions(&accounts, &ledger, 180, 100000, now);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].largest_transaction_amount, 150000);
        assert_eq!(found[0].large_transactions.len(), 1);
        assert_eq!(found[0].large_transactions[0].transaction_id, "T1");

        assert!(dormant_with_large_transactions(&accounts, &ledger, 180, 200000, now).is_empty());
    }

    #[test]
    fn test_dormant_with_large_transactions_needs_history() {
        let now = date(2024, 1, 1);
        let accounts = vec![account("A1", 0, date(2022, 1, 1))];
        assert!(dormant_with_large_transactions(&accounts, &[], 180, 0, now).is_empty());
    }

    #[test]
    fn test_salary_deposits_ignore_debits_and_descriptions() {
        let at = date(2023, 5, 1);
        let accounts = vec![account("A1", 0, at), account("A2", 0, at), account("A3", 0, at)];
        let ledger = vec![
            tx("T1", "A1", TransactionType::Credit, 60000, at).with_description("Transfer In"),
            tx("T2", "A1", TransactionType::Credit, 75000, at).with_description("Salary Deposit"),
            tx("T3", "A2", TransactionType::Debit, 90000, at).with_description("Salary Deposit"),
            tx("T4", "A3", TransactionType::Credit, 49999, at),
        ];

        let found = salary_deposit_accounts(&accounts, &ledger, 50000);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].account.account_id, "A1");
        assert_eq!(found[0].deposit_count, 2);
        assert_eq!(found[0].max_deposit, 75000);
        assert_eq!(found[0].deposits[0].transaction_id, "T1");
    }

    #[test]
    fn test_high_balance_sorted_descending_and_stable() {
        let at = date(2023, 1, 1);
        let accounts = vec![
            account("A1", 5_000_000, at),
            account("A2", 15_000_000, at),
            account("A3", 20_000_000, at),
            account("A4", 15_000_000, at),
        ];

        let found = high_balance_accounts(&accounts, 10_000_000);
        let ids: Vec<&str> = found.iter().map(|a| a.account_id.as_str()).collect();
        assert_eq!(ids, vec!["A3", "A2", "A4"]);
    }

    #[test]
    fn test_high_balance_threshold_is_inclusive() {
        let accounts = vec![account("A1", 12345, date(2023, 1, 1))];
        assert_eq!(high_balance_accounts(&accounts, 12345).len(), 1);
    }

    #[test]
    fn test_dormant_serializes_flat() {
        let now = date(2024, 1, 1);
        let accounts = vec![account("A1", 100, date(2023, 1, 1))];
        let dormant = dormant_accounts(&accounts, &[], 0, now);
        let json = serde_json::to_value(&dormant[0]).unwrap();
        assert_eq!(json["account_id"], "A1");
        assert_eq!(json["balance"], "1.00");
        assert!(json["last_transaction"].is_null());
        assert_eq!(json["days_inactive"], 365);
    }
}
