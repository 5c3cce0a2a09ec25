use std::path::{Path, PathBuf};

/// The three persisted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableName {
    Customers,
    Accounts,
    Ledger,
}

impl TableName {
    pub const ALL: [TableName; 3] = [TableName::Customers, TableName::Accounts, TableName::Ledger];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Customers => "customers",
            TableName::Accounts => "accounts",
            TableName::Ledger => "ledger",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            TableName::Customers => "customers.csv",
            TableName::Accounts => "accounts.csv",
            TableName::Ledger => "ledger.csv",
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the store keeps its files. One CSV per table inside `data_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn table_path(&self, table: TableName) -> PathBuf {
        self.data_dir.join(table.file_name())
    }

    pub fn customers_path(&self) -> PathBuf {
        self.table_path(TableName::Customers)
    }

    pub fn accounts_path(&self) -> PathBuf {
        self.table_path(TableName::Accounts)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.table_path(TableName::Ledger)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_paths() {
        let config = StoreConfig::new("/tmp/bank");
        assert_eq!(config.customers_path(), PathBuf::from("/tmp/bank/customers.csv"));
        assert_eq!(config.accounts_path(), PathBuf::from("/tmp/bank/accounts.csv"));
        assert_eq!(config.ledger_path(), PathBuf::from("/tmp/bank/ledger.csv"));
    }
}
