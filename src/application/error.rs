use thiserror::Error;

use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        match self {
            AppError::CustomerNotFound(_) | AppError::AccountNotFound(_) => true,
            AppError::Store(e) => e.is_not_found(),
            _ => false,
        }
    }
}
