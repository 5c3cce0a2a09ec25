mod common;

use std::fs;

use anyhow::Result;
use common::{account, credit, customer, parse_date};
use ledger_store::domain::{Account, CustomerStatus, ValidationError};
use ledger_store::storage::{LedgerStore, StorageError, StoreConfig, StoreError, Table};
use tempfile::TempDir;

fn test_store() -> Result<(LedgerStore, TempDir)> {
    let temp_dir = TempDir::new()?;
    let store = LedgerStore::init(StoreConfig::new(temp_dir.path()))?;
    Ok((store, temp_dir))
}

#[test]
fn test_init_creates_header_only_tables() -> Result<()> {
    let (store, temp) = test_store()?;

    assert!(store.customers().is_empty());
    assert!(store.accounts().is_empty());
    assert!(store.transactions().is_empty());

    let ledger = fs::read_to_string(temp.path().join("ledger.csv"))?;
    assert_eq!(
        ledger.trim(),
        "transaction_id,account_id,transaction_type,amount,description,balance_after,timestamp,reference_id,status"
    );

    // init is safe to repeat and keeps existing rows
    let mut store = store;
    store.add_customer(customer("C0001"))?;
    let again = LedgerStore::init(StoreConfig::new(temp.path()))?;
    assert_eq!(again.customers().len(), 1);

    Ok(())
}

#[test]
fn test_append_then_read_all_roundtrip() -> Result<()> {
    let (mut store, temp) = test_store()?;

    let c = customer("C0001");
    store.add_customer(c.clone())?;

    let a = account("A00001", "C0001", 1234550, "2023-01-01").with_interest_rate(235);
    store.add_account(a.clone())?;

    let t = credit("T0000001", "A00001", 150000, "2023-01-05").with_description("Salary, March");
    store.add_transaction(t.clone())?;

    let reopened = LedgerStore::open(StoreConfig::new(temp.path()))?;
    let matching: Vec<_> = reopened
        .customers()
        .iter()
        .filter(|r| r.customer_id == "C0001")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0], &c);
    assert_eq!(reopened.accounts(), &[a]);
    assert_eq!(reopened.transactions(), &[t]);

    Ok(())
}

#[test]
fn test_duplicate_id_is_rejected() -> Result<()> {
    let (mut store, _temp) = test_store()?;
    store.add_customer(customer("C0001"))?;

    let err = store.add_customer(customer("C0001")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::DuplicateId { table: "customers", .. })
    ));
    assert_eq!(store.customers().len(), 1);

    Ok(())
}

#[test]
fn test_missing_required_field_is_rejected() -> Result<()> {
    let (mut store, _temp) = test_store()?;

    let mut c = customer("C0001");
    c.last_name = String::new();
    let err = store.add_customer(c).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::MissingField(ref f)) if f == "last_name"
    ));
    assert!(store.customers().is_empty());

    Ok(())
}

#[test]
fn test_foreign_keys_are_enforced() -> Result<()> {
    let (mut store, _temp) = test_store()?;

    let err = store
        .add_account(account("A00001", "C9999", 0, "2023-01-01"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::MissingReference { field: "customer_id", .. })
    ));

    store.add_customer(customer("C0001"))?;
    store.add_account(account("A00001", "C0001", 0, "2023-01-01"))?;

    let err = store
        .add_transaction(credit("T0000001", "A99999", 100, "2023-01-05"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::MissingReference { field: "account_id", .. })
    ));

    let err = store
        .add_transaction(credit("T0000001", "A00001", 100, "2023-01-05").with_reference("T7777777"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::MissingReference { field: "reference_id", .. })
    ));

    let err = store
        .update_account("A00001", &[("customer_id", "C0404")])
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.accounts()[0].customer_id, "C0001");

    Ok(())
}

#[test]
fn test_update_unknown_id_is_not_found() -> Result<()> {
    let (mut store, _temp) = test_store()?;

    let err = store
        .update_customer("C0404", &[("status", "CLOSED")])
        .unwrap_err();
    assert!(err.is_not_found());

    Ok(())
}

#[test]
fn test_status_update_is_idempotent() -> Result<()> {
    let (mut store, temp) = test_store()?;
    store.add_customer(customer("C0001"))?;
    store.add_customer(customer("C0002"))?;

    store.update_customer("C0001", &[("status", "INACTIVE")])?;
    let once = fs::read_to_string(temp.path().join("customers.csv"))?;

    store.update_customer("C0001", &[("status", "INACTIVE")])?;
    let twice = fs::read_to_string(temp.path().join("customers.csv"))?;

    assert_eq!(once, twice);
    assert_eq!(
        store.get_customer("C0001").map(|c| c.status),
        Some(CustomerStatus::Inactive)
    );
    assert_eq!(
        store.get_customer("C0002").map(|c| c.status),
        Some(CustomerStatus::Active)
    );

    Ok(())
}

#[test]
fn test_foreign_key_lookup_preserves_scan_order() -> Result<()> {
    let (mut store, _temp) = test_store()?;
    store.add_customer(customer("C0001"))?;
    store.add_customer(customer("C0002"))?;
    store.add_account(account("A00003", "C0001", 0, "2023-01-01"))?;
    store.add_account(account("A00001", "C0002", 0, "2023-01-01"))?;
    store.add_account(account("A00002", "C0001", 0, "2023-01-01"))?;

    let ids: Vec<&str> = store
        .accounts_for_customer("C0001")?
        .iter()
        .map(|a| a.account_id.as_str())
        .collect();
    assert_eq!(ids, vec!["A00003", "A00002"]);

    let none = store.accounts_for_customer("C0404")?;
    assert!(none.is_empty());

    Ok(())
}

#[test]
fn test_open_fails_on_missing_file() -> Result<()> {
    let temp = TempDir::new()?;
    let err = LedgerStore::open(StoreConfig::new(temp.path())).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Storage(StorageError::MissingFile(_))
    ));
    Ok(())
}

#[test]
fn test_malformed_balance_aborts_load() -> Result<()> {
    let (mut store, temp) = test_store()?;
    store.add_customer(customer("C0001"))?;

    fs::write(
        temp.path().join("accounts.csv"),
        "account_id,customer_id,account_type,account_number,currency,balance,status,interest_rate,opened_date,closed_date\n\
         A00001,C0001,CHECKING,,USD,100.00,ACTIVE,0.0,2023-01-01T00:00:00Z,\n\
         A00002,C0001,CHECKING,,USD,lots,ACTIVE,0.0,2023-01-01T00:00:00Z,\n",
    )?;

    match store.reload() {
        Err(StoreError::Storage(StorageError::Malformed { line, source, .. })) => {
            assert_eq!(line, 3);
            assert!(matches!(source, ValidationError::InvalidValue { ref field, .. } if field == "balance"));
        }
        other => panic!("expected malformed row, got {:?}", other),
    }

    // a failed reload leaves the previous tables in place
    assert!(store.accounts().is_empty());
    assert_eq!(store.customers().len(), 1);

    Ok(())
}

#[test]
fn test_extra_decimal_places_are_rejected_not_truncated() -> Result<()> {
    let (mut store, temp) = test_store()?;
    store.add_customer(customer("C0001"))?;

    let accounts = "account_id,customer_id,account_type,account_number,currency,balance,status,interest_rate,opened_date,closed_date\n\
         A1,C0001,CHECKING,,USD,100.999,ACTIVE,0.0,2023-01-01T00:00:00Z,\n\
         A2,C0001,CHECKING,,USD,5.00,ACTIVE,0.0,2023-01-01T00:00:00Z,\n";
    fs::write(temp.path().join("accounts.csv"), accounts)?;

    match LedgerStore::open(StoreConfig::new(temp.path())) {
        Err(StoreError::Storage(StorageError::Malformed { line, source, .. })) => {
            assert_eq!(line, 2);
            assert!(matches!(source, ValidationError::InvalidValue { ref field, .. } if field == "balance"));
        }
        other => panic!("expected malformed row, got {:?}", other.map(|_| ())),
    }

    // the rejected file is left exactly as it was
    assert!(store.reload().is_err());
    assert_eq!(fs::read_to_string(temp.path().join("accounts.csv"))?, accounts);

    Ok(())
}

#[test]
fn test_reload_sees_external_writes() -> Result<()> {
    let (mut store, temp) = test_store()?;
    let mut other = LedgerStore::open(StoreConfig::new(temp.path()))?;

    other.add_customer(customer("C0001"))?;
    assert!(store.customers().is_empty());

    store.reload()?;
    assert_eq!(store.customers().len(), 1);

    Ok(())
}

#[test]
fn test_seed_rejects_dangling_references() -> Result<()> {
    let (mut store, _temp) = test_store()?;

    let err = store
        .seed(
            vec![customer("C0001")],
            vec![account("A00001", "C0002", 0, "2023-01-01")],
            vec![],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::MissingReference { .. })
    ));
    assert!(store.customers().is_empty());

    store.seed(
        vec![customer("C0001")],
        vec![account("A00001", "C0001", 0, "2023-01-01")],
        vec![credit("T0000001", "A00001", 500, "2023-02-01")],
    )?;
    assert!(store.check_integrity().is_ok());

    Ok(())
}

#[test]
fn test_integrity_report_lists_orphans() -> Result<()> {
    let (_store, temp) = test_store()?;

    fs::write(
        temp.path().join("accounts.csv"),
        "account_id,customer_id,account_type,account_number,currency,balance,status,interest_rate,opened_date,closed_date\n\
         A00001,C0404,SAVINGS,,USD,10.00,ACTIVE,1.5,2023-01-01,\n",
    )?;
    fs::write(
        temp.path().join("ledger.csv"),
        "transaction_id,account_id,transaction_type,amount,description,balance_after,timestamp,reference_id,status\n\
         T0000001,A00404,CREDIT,10.00,,10.00,2023-01-02,,COMPLETED\n",
    )?;

    let store = LedgerStore::open(StoreConfig::new(temp.path()))?;
    let report = store.check_integrity();
    assert!(!report.is_ok());
    assert_eq!(report.orphan_accounts, vec!["A00001".to_string()]);
    assert_eq!(report.orphan_transactions, vec!["T0000001".to_string()]);

    Ok(())
}

#[test]
fn test_table_load_directly() -> Result<()> {
    let (mut store, temp) = test_store()?;
    store.add_customer(customer("C0001"))?;
    store.add_account(account("A00001", "C0001", 99, "2023-01-01"))?;

    let mut table = Table::<Account>::load(temp.path().join("accounts.csv"))?;
    assert_eq!(table.records().len(), 1);
    assert_eq!(table.read_all()?[0].balance, 99);
    assert_eq!(
        table.get_by_id("A00001").map(|a| a.opened_date),
        Some(parse_date("2023-01-01"))
    );

    Ok(())
}
