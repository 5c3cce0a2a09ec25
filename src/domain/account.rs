use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BasisPoints, Cents, CustomerId, ValidationError, require};

pub type AccountId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Checking,
    Savings,
    MoneyMarket,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "CHECKING",
            AccountType::Savings => "SAVINGS",
            AccountType::MoneyMarket => "MONEY_MARKET",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "CHECKING" => Some(AccountType::Checking),
            "SAVINGS" => Some(AccountType::Savings),
            "MONEY_MARKET" => Some(AccountType::MoneyMarket),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    Active,
    Frozen,
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Frozen => "FROZEN",
            AccountStatus::Closed => "CLOSED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Some(AccountStatus::Active),
            "FROZEN" => Some(AccountStatus::Frozen),
            "CLOSED" => Some(AccountStatus::Closed),
            _ => None,
        }
    }

    /// Open accounts are the only ones considered for dormancy.
    pub fn is_open(&self) -> bool {
        matches!(self, AccountStatus::Active | AccountStatus::Frozen)
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A deposit account owned by exactly one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub customer_id: CustomerId,
    pub account_type: AccountType,
    pub account_number: String,
    pub currency: String,
    #[serde(with = "super::money::cents_str")]
    pub balance: Cents,
    pub status: AccountStatus,
    /// Annual rate in basis points, serialized as a percentage
    #[serde(with = "super::money::cents_str")]
    pub interest_rate: BasisPoints,
    pub opened_date: DateTime<Utc>,
    pub closed_date: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(
        account_id: impl Into<String>,
        customer_id: impl Into<String>,
        account_type: AccountType,
        currency: impl Into<String>,
        balance: Cents,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            customer_id: customer_id.into(),
            account_type,
            account_number: String::new(),
            currency: currency.into(),
            balance,
            status: AccountStatus::Active,
            interest_rate: 0,
            opened_date: Utc::now(),
            closed_date: None,
        }
    }

    pub fn with_account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = account_number.into();
        self
    }

    pub fn with_interest_rate(mut self, rate: BasisPoints) -> Self {
        self.interest_rate = rate;
        self
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_opened_date(mut self, opened_date: DateTime<Utc>) -> Self {
        self.opened_date = opened_date;
        self
    }

    pub fn with_closed_date(mut self, closed_date: DateTime<Utc>) -> Self {
        self.closed_date = Some(closed_date);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("account_id", &self.account_id)?;
        require("customer_id", &self.customer_id)?;
        require("currency", &self.currency)?;
        if self.interest_rate < 0 {
            return Err(ValidationError::invalid(
                "interest_rate",
                &super::format_rate(self.interest_rate),
                "must not be negative",
            ));
        }
        if let Some(closed) = self.closed_date {
            if closed < self.opened_date {
                return Err(ValidationError::invalid(
                    "closed_date",
                    &closed.to_rfc3339(),
                    "precedes opened_date",
                ));
            }
        }
        Ok(())
    }
}
