mod common;

use anyhow::Result;
use common::{SmallBank, account, customer, parse_date, test_service};
use ledger_store::application::AppError;
use ledger_store::domain::TransactionType;
use ledger_store::io::{LedgerSnapshot, write_dormant_report, write_snapshot};

fn ids<T>(rows: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
    rows.iter().map(|r| id(r).to_string()).collect()
}

#[test]
fn test_dormant_accounts_scenario() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    SmallBank::create(&mut service)?;

    // 181 days after A007's last transaction
    let rows = service.dormant_accounts(180, parse_date("2023-07-05"));
    let a007 = rows
        .iter()
        .find(|r| r.account.account_id == "A007")
        .expect("A007 should be dormant");
    assert_eq!(a007.days_inactive, 181);
    assert_eq!(a007.last_transaction, Some(parse_date("2023-01-05")));

    // one day earlier it is not
    let rows = service.dormant_accounts(180, parse_date("2023-07-03"));
    assert!(rows.iter().all(|r| r.account.account_id != "A007"));

    Ok(())
}

#[test]
fn test_dormant_accounts_skip_closed_and_recent() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    SmallBank::create(&mut service)?;

    let rows = service.dormant_accounts(180, parse_date("2024-06-01"));
    assert_eq!(
        ids(&rows, |r| r.account.account_id.as_str()),
        vec!["A007", "A008", "A011", "A012", "A013"]
    );

    Ok(())
}

#[test]
fn test_never_transacted_account_is_always_dormant() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    SmallBank::create(&mut service)?;

    let now = parse_date("2023-01-02");
    for days in [0, 1, 180, 10_000] {
        let rows = service.dormant_accounts(days, now);
        let a008 = rows
            .iter()
            .find(|r| r.account.account_id == "A008")
            .expect("A008 has no transactions");
        assert_eq!(a008.last_transaction, None);
        assert_eq!(a008.last_activity, parse_date("2023-01-01"));
        assert_eq!(a008.days_inactive, 1);
    }

    Ok(())
}

#[test]
fn test_dormant_with_large_transaction_threshold() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    SmallBank::create(&mut service)?;
    let now = parse_date("2024-06-01");

    let rows = service.dormant_with_large_transactions(180, 100_000, now);
    assert_eq!(
        ids(&rows, |r| r.dormant.account.account_id.as_str()),
        vec!["A007"]
    );
    assert_eq!(rows[0].largest_transaction_amount, 150_000);
    assert_eq!(rows[0].large_transactions.len(), 1);
    assert_eq!(rows[0].large_transactions[0].transaction_id, "T0000001");

    let rows = service.dormant_with_large_transactions(180, 200_000, now);
    assert!(rows.is_empty());

    Ok(())
}

#[test]
fn test_salary_deposits_by_threshold_only() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    SmallBank::create(&mut service)?;

    let rows = service.salary_deposit_accounts(50_000);
    assert_eq!(
        ids(&rows, |r| r.account.account_id.as_str()),
        vec!["A007", "A009", "A010"]
    );

    let a009 = &rows[1];
    assert_eq!(a009.deposit_count, 1);
    assert_eq!(a009.max_deposit, 250_000);
    // the debit on A009 is never a deposit
    assert!(a009.deposits.iter().all(|t| t.is_credit()));

    assert!(service.salary_deposit_accounts(1_000_000).is_empty());

    Ok(())
}

#[test]
fn test_high_balance_scenario() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    SmallBank::create(&mut service)?;

    let rows = service.high_balance_accounts(10_000_000);
    assert_eq!(ids(&rows, |a| a.account_id.as_str()), vec!["A013", "A012"]);
    assert_eq!(rows[0].balance, 20_000_000);
    assert_eq!(rows[1].balance, 15_000_000);

    Ok(())
}

#[test]
fn test_high_balance_includes_threshold_and_keeps_ties_in_order() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    SmallBank::create(&mut service)?;
    service.add_account(account("A014", "C0001", 15_000_000, "2022-01-01"))?;

    for a in service.store().accounts().to_vec() {
        let rows = service.high_balance_accounts(a.balance);
        assert!(rows.iter().any(|r| r.account_id == a.account_id));
    }

    let rows = service.high_balance_accounts(15_000_000);
    assert_eq!(
        ids(&rows, |a| a.account_id.as_str()),
        vec!["A013", "A012", "A014"]
    );

    Ok(())
}

#[test]
fn test_queries_reflect_recorded_transactions() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    SmallBank::create(&mut service)?;
    let now = parse_date("2024-06-01");

    assert!(service
        .dormant_accounts(180, now)
        .iter()
        .any(|r| r.account.account_id == "A012"));

    service.record_transaction(
        "A012",
        TransactionType::Debit,
        1_000_000,
        Some("Wire".into()),
        None,
        parse_date("2024-05-30"),
    )?;

    assert!(service
        .dormant_accounts(180, now)
        .iter()
        .all(|r| r.account.account_id != "A012"));
    assert_eq!(service.get_account_balance("A012")?, 14_000_000);

    Ok(())
}

#[test]
fn test_record_transaction_rejects_overflowing_balance() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    service.add_customer(customer("C0001"))?;
    service.add_account(account("A1", "C0001", 9_000_000_000_000_000_000, "2023-01-01"))?;

    let err = service
        .record_transaction(
            "A1",
            TransactionType::Credit,
            9_000_000_000_000_000_000,
            None,
            None,
            parse_date("2024-05-30"),
        )
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    // nothing is written when the new balance cannot be represented
    assert!(service.store().transactions().is_empty());
    service.reload()?;
    assert_eq!(service.get_account_balance("A1")?, 9_000_000_000_000_000_000);

    Ok(())
}

#[test]
fn test_dormant_accounts_sorted_by_id_after_late_insert() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    SmallBank::create(&mut service)?;
    service.add_account(account("A001", "C0001", 0, "2022-01-01"))?;

    let rows = service.dormant_accounts(180, parse_date("2024-06-01"));
    assert_eq!(
        ids(&rows, |r| r.account.account_id.as_str()),
        vec!["A001", "A007", "A008", "A011", "A012", "A013"]
    );

    Ok(())
}

#[test]
fn test_dormant_report_and_snapshot() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    SmallBank::create(&mut service)?;

    let rows = service.dormant_with_large_transactions(180, 100_000, parse_date("2024-06-01"));
    let mut report = Vec::new();
    assert_eq!(write_dormant_report(&rows, &mut report)?, 1);
    let report = String::from_utf8(report)?;
    assert!(report.starts_with("account_id,customer_id,account_number,last_transaction_date"));
    assert!(report.contains("A007,C0001,,2023-01-05T00:00:00Z,513,1500.00,ACTIVE,420.00"));

    let mut out = Vec::new();
    let exported_at = parse_date("2024-06-01");
    write_snapshot(&service, exported_at, &mut out)?;
    let snapshot: LedgerSnapshot = serde_json::from_slice(&out)?;
    assert_eq!(snapshot.exported_at, exported_at);
    assert_eq!(snapshot.customers.len(), 1);
    assert_eq!(snapshot.accounts.len(), 7);
    assert_eq!(snapshot.transactions.len(), 5);
    assert_eq!(snapshot.accounts, service.store().accounts());

    Ok(())
}
