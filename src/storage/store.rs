use std::collections::HashSet;
use std::fs;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{Account, Customer, Transaction, ValidationError};

use super::{Record, StorageError, StoreConfig, StoreError, Table, TableName};

/// Owner of the customer, account and ledger tables.
///
/// The store holds every record in memory and rewrites the affected file on
/// each mutation. It is meant for a single writer process.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    config: StoreConfig,
    customers: Table<Customer>,
    accounts: Table<Account>,
    ledger: Table<Transaction>,
}

/// Record counts and dangling references found by [`LedgerStore::check_integrity`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub customers: usize,
    pub accounts: usize,
    pub transactions: usize,
    /// Accounts whose customer does not exist
    pub orphan_accounts: Vec<String>,
    /// Transactions whose account does not exist
    pub orphan_transactions: Vec<String>,
}

impl IntegrityReport {
    pub fn is_ok(&self) -> bool {
        self.orphan_accounts.is_empty() && self.orphan_transactions.is_empty()
    }
}

impl LedgerStore {
    /// Create the data directory and any missing table files, then open the store.
    pub fn init(config: StoreConfig) -> Result<Self, StoreError> {
        fs::create_dir_all(config.data_dir()).map_err(|source| StorageError::Io {
            path: config.data_dir().to_path_buf(),
            source,
        })?;

        for table in TableName::ALL {
            let path = config.table_path(table);
            if path.exists() {
                continue;
            }
            match table {
                TableName::Customers => Table::<Customer>::create_empty(&path)?,
                TableName::Accounts => Table::<Account>::create_empty(&path)?,
                TableName::Ledger => Table::<Transaction>::create_empty(&path)?,
            }
            info!(table = table.as_str(), path = %path.display(), "created table file");
        }

        Self::open(config)
    }

    /// Load all three tables. Any missing or malformed file aborts the open.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let customers = Table::load(config.customers_path())?;
        let accounts = Table::load(config.accounts_path())?;
        let ledger = Table::load(config.ledger_path())?;

        info!(
            data_dir = %config.data_dir().display(),
            customers = customers.len(),
            accounts = accounts.len(),
            transactions = ledger.len(),
            "opened ledger store"
        );

        Ok(Self {
            config,
            customers,
            accounts,
            ledger,
        })
    }

    /// Re-read every table from disk. Nothing changes unless all three load.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let customers = Table::load(self.config.customers_path())?;
        let accounts = Table::load(self.config.accounts_path())?;
        let ledger = Table::load(self.config.ledger_path())?;

        self.customers = customers;
        self.accounts = accounts;
        self.ledger = ledger;
        debug!("reloaded ledger store");
        Ok(())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn customers(&self) -> &[Customer] {
        self.customers.records()
    }

    pub fn accounts(&self) -> &[Account] {
        self.accounts.records()
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.records()
    }

    pub fn get_customer(&self, customer_id: &str) -> Option<&Customer> {
        self.customers.get_by_id(customer_id)
    }

    pub fn get_account(&self, account_id: &str) -> Option<&Account> {
        self.accounts.get_by_id(account_id)
    }

    pub fn get_transaction(&self, transaction_id: &str) -> Option<&Transaction> {
        self.ledger.get_by_id(transaction_id)
    }

    /// Accounts owned by a customer, in table order.
    pub fn accounts_for_customer(&self, customer_id: &str) -> Result<Vec<&Account>, StoreError> {
        Ok(self.accounts.get_by_foreign_key("customer_id", customer_id)?)
    }

    /// Ledger entries of an account, in table order.
    pub fn transactions_for_account(
        &self,
        account_id: &str,
    ) -> Result<Vec<&Transaction>, StoreError> {
        Ok(self.ledger.get_by_foreign_key("account_id", account_id)?)
    }

    pub fn add_customer(&mut self, customer: Customer) -> Result<&Customer, StoreError> {
        let customer = self.customers.append(customer)?;
        info!(customer_id = %customer.customer_id, "added customer");
        Ok(customer)
    }

    /// Append an account. Its customer must already exist.
    pub fn add_account(&mut self, account: Account) -> Result<&Account, StoreError> {
        if !self.customers.contains(&account.customer_id) {
            return Err(ValidationError::MissingReference {
                field: "customer_id",
                id: account.customer_id,
            }
            .into());
        }
        let account = self.accounts.append(account)?;
        info!(account_id = %account.account_id, "added account");
        Ok(account)
    }

    /// Append a ledger entry. Its account, and its reference if any, must exist.
    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<&Transaction, StoreError> {
        if !self.accounts.contains(&transaction.account_id) {
            return Err(ValidationError::MissingReference {
                field: "account_id",
                id: transaction.account_id,
            }
            .into());
        }
        if let Some(reference) = &transaction.reference_id {
            if !self.ledger.contains(reference) {
                return Err(ValidationError::MissingReference {
                    field: "reference_id",
                    id: reference.clone(),
                }
                .into());
            }
        }
        let transaction = self.ledger.append(transaction)?;
        debug!(transaction_id = %transaction.transaction_id, "appended transaction");
        Ok(transaction)
    }

    pub fn update_customer(
        &mut self,
        customer_id: &str,
        updates: &[(&str, &str)],
    ) -> Result<&Customer, StoreError> {
        let customer = self.customers.update_fields(customer_id, updates)?;
        info!(customer_id, fields = updates.len(), "updated customer");
        Ok(customer)
    }

    /// Overwrite account columns. A new `customer_id` must reference an existing customer.
    pub fn update_account(
        &mut self,
        account_id: &str,
        updates: &[(&str, &str)],
    ) -> Result<&Account, StoreError> {
        for (field, value) in updates {
            if *field == "customer_id" && !self.customers.contains(value) {
                return Err(ValidationError::MissingReference {
                    field: "customer_id",
                    id: value.to_string(),
                }
                .into());
            }
        }
        let account = self.accounts.update_fields(account_id, updates)?;
        info!(account_id, fields = updates.len(), "updated account");
        Ok(account)
    }

    /// Scan for dangling foreign keys.
    pub fn check_integrity(&self) -> IntegrityReport {
        let orphan_accounts = self
            .accounts
            .records()
            .iter()
            .filter(|a| !self.customers.contains(&a.customer_id))
            .map(|a| a.account_id.clone())
            .collect();

        let account_ids: HashSet<&str> = self.accounts.records().iter().map(|a| a.id()).collect();
        let orphan_transactions = self
            .ledger
            .records()
            .iter()
            .filter(|t| !account_ids.contains(t.account_id.as_str()))
            .map(|t| t.transaction_id.clone())
            .collect();

        IntegrityReport {
            customers: self.customers.len(),
            accounts: self.accounts.len(),
            transactions: self.ledger.len(),
            orphan_accounts,
            orphan_transactions,
        }
    }

    /// Replace all three tables at once.
    ///
    /// Foreign keys are checked across the new data before anything is written.
    pub fn seed(
        &mut self,
        customers: Vec<Customer>,
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
    ) -> Result<(), StoreError> {
        let customer_ids: HashSet<&str> = customers.iter().map(|c| c.id()).collect();
        if let Some(orphan) = accounts
            .iter()
            .find(|a| !customer_ids.contains(a.customer_id.as_str()))
        {
            return Err(ValidationError::MissingReference {
                field: "customer_id",
                id: orphan.customer_id.clone(),
            }
            .into());
        }

        let account_ids: HashSet<&str> = accounts.iter().map(|a| a.id()).collect();
        if let Some(orphan) = transactions
            .iter()
            .find(|t| !account_ids.contains(t.account_id.as_str()))
        {
            return Err(ValidationError::MissingReference {
                field: "account_id",
                id: orphan.account_id.clone(),
            }
            .into());
        }

        let counts = (customers.len(), accounts.len(), transactions.len());
        self.customers.replace_all(customers)?;
        self.accounts.replace_all(accounts)?;
        self.ledger.replace_all(transactions)?;

        info!(
            customers = counts.0,
            accounts = counts.1,
            transactions = counts.2,
            "seeded ledger store"
        );
        Ok(())
    }
}
