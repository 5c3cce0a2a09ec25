mod common;

use anyhow::Result;
use common::parse_date;
use ledger_store::application::BankService;
use ledger_store::io::SampleDataGenerator;
use ledger_store::storage::{LedgerStore, StoreConfig};
use tempfile::TempDir;

#[test]
fn test_generated_data_survives_a_reopen() -> Result<()> {
    let temp = TempDir::new()?;
    let now = parse_date("2024-06-01");

    let data = SampleDataGenerator::new(7, now).generate(25);
    let expected = data.clone();

    let mut store = LedgerStore::init(StoreConfig::new(temp.path()))?;
    data.write_to(&mut store)?;

    let service = BankService::open(StoreConfig::new(temp.path()))?;
    let store = service.store();
    assert_eq!(store.customers(), expected.customers.as_slice());
    assert_eq!(store.accounts(), expected.accounts.as_slice());
    assert_eq!(store.transactions(), expected.transactions.as_slice());

    let report = service.check_integrity();
    assert!(report.is_ok());
    assert_eq!(report.customers, 25);
    assert_eq!(report.accounts, expected.accounts.len());

    Ok(())
}

#[test]
fn test_generated_ledgers_end_at_account_balance() -> Result<()> {
    let temp = TempDir::new()?;
    let now = parse_date("2024-06-01");

    let mut store = LedgerStore::init(StoreConfig::new(temp.path()))?;
    SampleDataGenerator::new(42, now)
        .generate(40)
        .write_to(&mut store)?;
    let store = LedgerStore::open(StoreConfig::new(temp.path()))?;

    for account in store.accounts() {
        let mut history = store.transactions_for_account(&account.account_id)?;
        history.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });
        if let Some(last) = history.last() {
            assert_eq!(last.balance_after, account.balance, "{}", account.account_id);
        }
        for t in history {
            assert!(t.timestamp >= account.opened_date);
            assert!(t.timestamp <= now);
        }
    }

    Ok(())
}

#[test]
fn test_regenerating_replaces_previous_rows() -> Result<()> {
    let temp = TempDir::new()?;
    let now = parse_date("2024-06-01");
    let mut store = LedgerStore::init(StoreConfig::new(temp.path()))?;

    SampleDataGenerator::new(1, now).generate(30).write_to(&mut store)?;
    SampleDataGenerator::new(2, now).generate(5).write_to(&mut store)?;

    let reopened = LedgerStore::open(StoreConfig::new(temp.path()))?;
    assert_eq!(reopened.customers().len(), 5);
    assert!(reopened.check_integrity().is_ok());

    Ok(())
}
