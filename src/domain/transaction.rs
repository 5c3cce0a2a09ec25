use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, Cents, ValidationError, require};

pub type TransactionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Debit => "DEBIT",
            TransactionType::Credit => "CREDIT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DEBIT" => Some(TransactionType::Debit),
            "CREDIT" => Some(TransactionType::Credit),
            _ => None,
        }
    }

    /// Apply this movement to a balance. Credits add, debits subtract.
    /// `None` if the new balance does not fit in `Cents`.
    pub fn apply(&self, balance: Cents, amount: Cents) -> Option<Cents> {
        match self {
            TransactionType::Credit => balance.checked_add(amount),
            TransactionType::Debit => balance.checked_sub(amount),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Reversed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Reversed => "REVERSED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(TransactionStatus::Pending),
            "COMPLETED" => Some(TransactionStatus::Completed),
            "REVERSED" => Some(TransactionStatus::Reversed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger entry against one account.
/// Entries are append-only; `balance_after` is captured when the entry is
/// written and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub account_id: AccountId,
    pub transaction_type: TransactionType,
    #[serde(with = "super::money::cents_str")]
    pub amount: Cents,
    pub description: String,
    #[serde(with = "super::money::cents_str")]
    pub balance_after: Cents,
    pub timestamp: DateTime<Utc>,
    /// Related transaction, e.g. the original of a reversal
    pub reference_id: Option<TransactionId>,
    pub status: TransactionStatus,
}

impl Transaction {
    pub fn new(
        transaction_id: impl Into<String>,
        account_id: impl Into<String>,
        transaction_type: TransactionType,
        amount: Cents,
        balance_after: Cents,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            account_id: account_id.into(),
            transaction_type,
            amount,
            description: String::new(),
            balance_after,
            timestamp,
            reference_id: None,
            status: TransactionStatus::Completed,
        }
    }

    /// Generate a short ledger identifier: `T` followed by 8 hex characters.
    pub fn generate_id() -> TransactionId {
        let simple = Uuid::new_v4().simple().to_string();
        format!("T{}", simple[..8].to_uppercase())
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_reference(mut self, reference_id: impl Into<String>) -> Self {
        self.reference_id = Some(reference_id.into());
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_credit(&self) -> bool {
        self.transaction_type == TransactionType::Credit
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("transaction_id", &self.transaction_id)?;
        require("account_id", &self.account_id)?;
        if let Some(reference) = &self.reference_id {
            if reference == &self.transaction_id {
                return Err(ValidationError::invalid(
                    "reference_id",
                    reference,
                    "transaction cannot reference itself",
                ));
            }
        }
        Ok(())
    }
}
