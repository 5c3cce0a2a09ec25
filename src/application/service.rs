use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::domain::{
    Account, AccountStatus, Cents, Customer, CustomerStatus, DormantAccount,
    DormantWithLargeTransactions, FeeWaiverDecision, FeeWaiverRequest, SalaryDepositAccount,
    Transaction, TransactionType, analytics, checked_total, evaluate_fee_waiver, format_cents,
    format_timestamp,
};
use crate::storage::{IntegrityReport, LedgerStore, StoreConfig};

use super::{AccountSummary, AppError, CustomerSummary, FeeSchedule};

/// Customers younger than this many months count as new for fee waivers.
const NEW_CUSTOMER_MONTHS: u32 = 3;
const ACTIVITY_WINDOW_DAYS: i64 = 30;

/// Banking operations over one ledger store.
/// This is the interface every adapter (CLI, tool server) goes through.
#[derive(Debug)]
pub struct BankService {
    store: LedgerStore,
}

impl BankService {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Create the data directory and empty tables if needed.
    pub fn init(config: StoreConfig) -> Result<Self, AppError> {
        Ok(Self::new(LedgerStore::init(config)?))
    }

    /// Open an existing data directory.
    pub fn open(config: StoreConfig) -> Result<Self, AppError> {
        Ok(Self::new(LedgerStore::open(config)?))
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LedgerStore {
        &mut self.store
    }

    /// Pick up changes written by other processes.
    pub fn reload(&mut self) -> Result<(), AppError> {
        self.store.reload()?;
        Ok(())
    }

    // ========================
    // Customer operations
    // ========================

    pub fn add_customer(&mut self, customer: Customer) -> Result<Customer, AppError> {
        Ok(self.store.add_customer(customer)?.clone())
    }

    pub fn get_customer(&self, customer_id: &str) -> Result<Customer, AppError> {
        self.store
            .get_customer(customer_id)
            .cloned()
            .ok_or_else(|| AppError::CustomerNotFound(customer_id.to_string()))
    }

    pub fn list_customers(&self, status: Option<CustomerStatus>) -> Vec<Customer> {
        self.store
            .customers()
            .iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect()
    }

    pub fn set_customer_status(
        &mut self,
        customer_id: &str,
        status: CustomerStatus,
    ) -> Result<Customer, AppError> {
        self.get_customer(customer_id)?;
        let customer = self
            .store
            .update_customer(customer_id, &[("status", status.as_str())])?;
        Ok(customer.clone())
    }

    // ========================
    // Account operations
    // ========================

    pub fn add_account(&mut self, account: Account) -> Result<Account, AppError> {
        self.get_customer(&account.customer_id)?;
        Ok(self.store.add_account(account)?.clone())
    }

    pub fn get_account(&self, account_id: &str) -> Result<Account, AppError> {
        self.store
            .get_account(account_id)
            .cloned()
            .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))
    }

    /// All accounts, or only those of one customer.
    pub fn list_accounts(&self, customer_id: Option<&str>) -> Result<Vec<Account>, AppError> {
        match customer_id {
            Some(id) => {
                self.get_customer(id)?;
                Ok(self
                    .store
                    .accounts_for_customer(id)?
                    .into_iter()
                    .cloned()
                    .collect())
            }
            None => Ok(self.store.accounts().to_vec()),
        }
    }

    /// Change an account's status. Closing stamps `closed_date` once; moving
    /// out of CLOSED clears it.
    pub fn set_account_status(
        &mut self,
        account_id: &str,
        status: AccountStatus,
        now: DateTime<Utc>,
    ) -> Result<Account, AppError> {
        let current = self.get_account(account_id)?;

        let closed = format_timestamp(&now);
        let mut updates = vec![("status", status.as_str())];
        if status == AccountStatus::Closed && current.closed_date.is_none() {
            updates.push(("closed_date", closed.as_str()));
        } else if status != AccountStatus::Closed && current.closed_date.is_some() {
            updates.push(("closed_date", ""));
        }

        let account = self.store.update_account(account_id, &updates)?;
        info!(account_id, status = %status, "account status changed");
        Ok(account.clone())
    }

    pub fn update_account_balance(
        &mut self,
        account_id: &str,
        balance: Cents,
    ) -> Result<Account, AppError> {
        self.get_account(account_id)?;
        let formatted = format_cents(balance);
        let account = self
            .store
            .update_account(account_id, &[("balance", formatted.as_str())])?;
        Ok(account.clone())
    }

    pub fn get_account_balance(&self, account_id: &str) -> Result<Cents, AppError> {
        Ok(self.get_account(account_id)?.balance)
    }

    // ========================
    // Ledger operations
    // ========================

    /// Post a movement to an account and update its balance.
    ///
    /// The ledger entry is written first, then the account row. No overdraft
    /// check is made: debits may take the balance below zero.
    pub fn record_transaction(
        &mut self,
        account_id: &str,
        transaction_type: TransactionType,
        amount: Cents,
        description: Option<String>,
        reference_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Transaction, AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "{} (must be positive)",
                format_cents(amount)
            )));
        }

        let account = self.get_account(account_id)?;
        let balance_after = transaction_type
            .apply(account.balance, amount)
            .ok_or_else(|| {
                AppError::InvalidAmount(format!(
                    "{} would take {} out of range",
                    format_cents(amount),
                    account_id
                ))
            })?;

        let mut transaction_id = Transaction::generate_id();
        while self.store.get_transaction(&transaction_id).is_some() {
            transaction_id = Transaction::generate_id();
        }

        let mut transaction = Transaction::new(
            transaction_id,
            account_id,
            transaction_type,
            amount,
            balance_after,
            now,
        );
        if let Some(desc) = description {
            transaction = transaction.with_description(desc);
        }
        if let Some(reference) = reference_id {
            transaction = transaction.with_reference(reference);
        }

        let transaction = self.store.add_transaction(transaction)?.clone();
        self.update_account_balance(account_id, balance_after)?;

        info!(
            transaction_id = %transaction.transaction_id,
            account_id,
            kind = %transaction_type,
            amount = %format_cents(amount),
            "recorded transaction"
        );
        Ok(transaction)
    }

    /// Transactions of one account in ledger order; with `limit`, only the last ones.
    pub fn list_transactions(
        &self,
        account_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>, AppError> {
        self.get_account(account_id)?;
        let all = self.store.transactions_for_account(account_id)?;
        let skip = match limit {
            Some(limit) => all.len().saturating_sub(limit),
            None => 0,
        };
        Ok(all.into_iter().skip(skip).cloned().collect())
    }

    // ========================
    // Summaries
    // ========================

    pub fn customer_summary(&self, customer_id: &str) -> Result<CustomerSummary, AppError> {
        let customer = self.get_customer(customer_id)?;
        let accounts = self.list_accounts(Some(customer_id))?;
        let total_balance = checked_total(accounts.iter().map(|a| a.balance)).ok_or_else(|| {
            AppError::InvalidAmount(format!("total balance of {} out of range", customer_id))
        })?;

        Ok(CustomerSummary {
            customer,
            account_count: accounts.len(),
            accounts,
            total_balance,
        })
    }

    pub fn account_summary(&self, account_id: &str) -> Result<AccountSummary, AppError> {
        let account = self.get_account(account_id)?;
        let transactions = self.list_transactions(account_id, None)?;

        Ok(AccountSummary {
            current_balance: account.balance,
            account,
            transaction_count: transactions.len(),
            transactions,
        })
    }

    // ========================
    // Analytics
    // ========================

    pub fn dormant_accounts(&self, days_inactive: u32, now: DateTime<Utc>) -> Vec<DormantAccount> {
        analytics::dormant_accounts(
            self.store.accounts(),
            self.store.transactions(),
            days_inactive,
            now,
        )
    }

    pub fn dormant_with_large_transactions(
        &self,
        days_inactive: u32,
        threshold: Cents,
        now: DateTime<Utc>,
    ) -> Vec<DormantWithLargeTransactions> {
        analytics::dormant_with_large_transactions(
            self.store.accounts(),
            self.store.transactions(),
            days_inactive,
            threshold,
            now,
        )
    }

    pub fn salary_deposit_accounts(&self, min_amount: Cents) -> Vec<SalaryDepositAccount> {
        analytics::salary_deposit_accounts(
            self.store.accounts(),
            self.store.transactions(),
            min_amount,
        )
    }

    pub fn high_balance_accounts(&self, min_balance: Cents) -> Vec<Account> {
        analytics::high_balance_accounts(self.store.accounts(), min_balance)
    }

    /// Build a fee waiver request from the account's history and evaluate it.
    pub fn fee_waiver(
        &self,
        account_id: &str,
        schedule: FeeSchedule,
        now: DateTime<Utc>,
    ) -> Result<FeeWaiverDecision, AppError> {
        let request = self.fee_waiver_request(account_id, schedule, now)?;
        evaluate_fee_waiver(&request).ok_or_else(|| {
            AppError::InvalidAmount(format!("fees for {} out of range", account_id))
        })
    }

    pub fn fee_waiver_request(
        &self,
        account_id: &str,
        schedule: FeeSchedule,
        now: DateTime<Utc>,
    ) -> Result<FeeWaiverRequest, AppError> {
        let account = self.get_account(account_id)?;

        let window_start = now - Duration::days(ACTIVITY_WINDOW_DAYS);
        let monthly_transaction_count = self
            .store
            .transactions_for_account(account_id)?
            .iter()
            .filter(|t| t.timestamp > window_start && t.timestamp <= now)
            .count();

        let tenure_days = analytics::days_between(account.opened_date, now).max(0);
        let account_tenure_months = u32::try_from(tenure_days / ACTIVITY_WINDOW_DAYS).unwrap_or(u32::MAX);

        Ok(FeeWaiverRequest {
            account_id: account.account_id,
            account_balance: account.balance,
            monthly_transaction_count: u32::try_from(monthly_transaction_count)
                .unwrap_or(u32::MAX),
            account_tenure_months,
            account_status: account.status,
            is_premium_customer: schedule.premium,
            is_new_customer: account_tenure_months < NEW_CUSTOMER_MONTHS,
            annual_fee: schedule.annual_fee,
            monthly_maintenance_fee: schedule.monthly_fee,
        })
    }

    pub fn check_integrity(&self) -> IntegrityReport {
        self.store.check_integrity()
    }
}
