use crate::domain::{
    Account, AccountStatus, AccountType, Customer, CustomerStatus, Transaction, TransactionStatus,
    TransactionType, ValidationError, format_cents, format_rate, format_timestamp, parse_rate,
};

use super::{Record, Row, TableName};

impl Record for Customer {
    const TABLE: TableName = TableName::Customers;
    const COLUMNS: &'static [&'static str] = &[
        "customer_id",
        "first_name",
        "last_name",
        "email",
        "phone",
        "address",
        "date_of_birth",
        "created_date",
        "status",
    ];

    fn id(&self) -> &str {
        &self.customer_id
    }

    fn from_row(row: &Row<'_>) -> Result<Self, ValidationError> {
        Ok(Customer {
            customer_id: row.required("customer_id")?.to_string(),
            first_name: row.required("first_name")?.to_string(),
            last_name: row.required("last_name")?.to_string(),
            email: row.text("email").to_string(),
            phone: row.text("phone").to_string(),
            address: row.text("address").to_string(),
            date_of_birth: row.date("date_of_birth")?,
            created_date: row.timestamp("created_date")?,
            status: row.parse_enum("status", CustomerStatus::from_str)?,
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.customer_id.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.address.clone(),
            self.date_of_birth.format("%Y-%m-%d").to_string(),
            format_timestamp(&self.created_date),
            self.status.as_str().to_string(),
        ]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Customer::validate(self)
    }
}

impl Record for Account {
    const TABLE: TableName = TableName::Accounts;
    const COLUMNS: &'static [&'static str] = &[
        "account_id",
        "customer_id",
        "account_type",
        "account_number",
        "currency",
        "balance",
        "status",
        "interest_rate",
        "opened_date",
        "closed_date",
    ];

    fn id(&self) -> &str {
        &self.account_id
    }

    fn from_row(row: &Row<'_>) -> Result<Self, ValidationError> {
        let rate = row.required("interest_rate")?;
        let interest_rate = parse_rate(rate)
            .map_err(|e| ValidationError::invalid("interest_rate", rate, e.to_string()))?;

        Ok(Account {
            account_id: row.required("account_id")?.to_string(),
            customer_id: row.required("customer_id")?.to_string(),
            account_type: row.parse_enum("account_type", AccountType::from_str)?,
            account_number: row.text("account_number").to_string(),
            currency: row.required("currency")?.to_string(),
            balance: row.cents("balance")?,
            status: row.parse_enum("status", AccountStatus::from_str)?,
            interest_rate,
            opened_date: row.timestamp("opened_date")?,
            closed_date: row.optional_timestamp("closed_date")?,
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.account_id.clone(),
            self.customer_id.clone(),
            self.account_type.as_str().to_string(),
            self.account_number.clone(),
            self.currency.clone(),
            format_cents(self.balance),
            self.status.as_str().to_string(),
            format_rate(self.interest_rate),
            format_timestamp(&self.opened_date),
            self.closed_date
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
        ]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Account::validate(self)
    }
}

impl Record for Transaction {
    const TABLE: TableName = TableName::Ledger;
    const COLUMNS: &'static [&'static str] = &[
        "transaction_id",
        "account_id",
        "transaction_type",
        "amount",
        "description",
        "balance_after",
        "timestamp",
        "reference_id",
        "status",
    ];

    fn id(&self) -> &str {
        &self.transaction_id
    }

    fn from_row(row: &Row<'_>) -> Result<Self, ValidationError> {
        Ok(Transaction {
            transaction_id: row.required("transaction_id")?.to_string(),
            account_id: row.required("account_id")?.to_string(),
            transaction_type: row.parse_enum("transaction_type", TransactionType::from_str)?,
            amount: row.cents("amount")?,
            description: row.text("description").to_string(),
            balance_after: row.cents("balance_after")?,
            timestamp: row.timestamp("timestamp")?,
            reference_id: row.optional("reference_id").map(str::to_string),
            status: row.parse_enum("status", TransactionStatus::from_str)?,
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.transaction_id.clone(),
            self.account_id.clone(),
            self.transaction_type.as_str().to_string(),
            format_cents(self.amount),
            self.description.clone(),
            format_cents(self.balance_after),
            format_timestamp(&self.timestamp),
            self.reference_id.clone().unwrap_or_default(),
            self.status.as_str().to_string(),
        ]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Transaction::validate(self)
    }
}
