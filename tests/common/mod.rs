// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use ledger_store::application::BankService;
use ledger_store::domain::{
    Account, AccountStatus, AccountType, Cents, Customer, Transaction, TransactionType,
};
use ledger_store::storage::StoreConfig;
use tempfile::TempDir;

/// Helper to create a service over an empty temporary data directory
pub fn test_service() -> Result<(BankService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = BankService::init(StoreConfig::new(temp_dir.path()))?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

pub fn customer(id: &str) -> Customer {
    Customer::new(
        id,
        "Mary",
        "Smith",
        NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
    )
    .with_contact(format!("{}@example.com", id.to_lowercase()), "555-0101", "1 Main St")
    .with_created_date(parse_date("2022-01-01"))
}

pub fn account(id: &str, customer_id: &str, balance: Cents, opened: &str) -> Account {
    Account::new(id, customer_id, AccountType::Checking, "USD", balance)
        .with_opened_date(parse_date(opened))
}

pub fn credit(id: &str, account_id: &str, amount: Cents, date: &str) -> Transaction {
    Transaction::new(
        id,
        account_id,
        TransactionType::Credit,
        amount,
        amount,
        parse_date(date),
    )
}

/// Test fixture: a small bank with known dormancy and balances
pub struct SmallBank;

impl SmallBank {
    /// One customer and the accounts the analytical scenarios talk about:
    ///
    /// - A007 opened 2023-01-01, last transaction 2023-01-05 (a 1500.00 credit)
    /// - A008 opened 2023-01-01, never transacted
    /// - A009 active in 2024, balance 2000.00
    /// - A010 closed, old activity
    /// - A011/A012/A013 with balances 50000, 150000, 200000
    pub fn create(service: &mut BankService) -> Result<()> {
        service.add_customer(customer("C0001"))?;

        service.add_account(account("A007", "C0001", 42000, "2023-01-01"))?;
        service.add_account(account("A008", "C0001", 0, "2023-01-01"))?;
        service.add_account(account("A009", "C0001", 200000, "2023-06-01"))?;
        service.add_account(
            account("A010", "C0001", 0, "2022-01-01").with_status(AccountStatus::Closed),
        )?;
        service.add_account(account("A011", "C0001", 5_000_000, "2022-01-01"))?;
        service.add_account(account("A012", "C0001", 15_000_000, "2022-01-01"))?;
        service.add_account(account("A013", "C0001", 20_000_000, "2022-01-01"))?;

        let store = service.store_mut();
        store.add_transaction(credit("T0000001", "A007", 150000, "2023-01-05"))?;
        store.add_transaction(
            Transaction::new(
                "T0000002",
                "A009",
                TransactionType::Credit,
                250000,
                250000,
                parse_date("2024-05-20"),
            )
            .with_description("Salary Deposit"),
        )?;
        store.add_transaction(
            Transaction::new(
                "T0000003",
                "A009",
                TransactionType::Debit,
                50000,
                200000,
                parse_date("2024-05-25"),
            )
            .with_description("Transfer Out"),
        )?;
        store.add_transaction(credit("T0000004", "A010", 300000, "2022-03-01"))?;
        store.add_transaction(credit("T0000005", "A011", 40000, "2022-02-01"))?;
        Ok(())
    }
}
