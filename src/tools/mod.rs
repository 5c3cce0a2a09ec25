//! Named analytical tools with JSON parameters and JSON results.
//!
//! Tools are what the stdio server and the `tool` CLI command expose. Each one
//! maps a small parameter object onto one of the service's analytical queries.

pub mod stdio;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::application::{AppError, BankService};
use crate::domain::{Cents, checked_total, format_cents};

pub use stdio::StdioServer;

pub const DEFAULT_DAYS_INACTIVE: u32 = 180;
pub const DEFAULT_LARGE_TX_THRESHOLD: Cents = 100_000;
pub const DEFAULT_SALARY_MIN_AMOUNT: Cents = 50_000;
pub const DEFAULT_MIN_BALANCE: Cents = 10_000_000;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    App(#[from] AppError),
}

impl ToolError {
    /// JSON-RPC error code for this failure.
    pub fn code(&self) -> i64 {
        match self {
            ToolError::UnknownTool(_) => -32601,
            ToolError::InvalidParams(_) => -32602,
            ToolError::App(_) => -32000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    DormantAccounts,
    DormantWithLargeTx,
    SalaryDeposits,
    HighBalance,
}

impl Tool {
    pub const ALL: [Tool; 4] = [
        Tool::DormantAccounts,
        Tool::DormantWithLargeTx,
        Tool::SalaryDeposits,
        Tool::HighBalance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::DormantAccounts => "dormant_accounts",
            Tool::DormantWithLargeTx => "dormant_with_large_tx",
            Tool::SalaryDeposits => "salary_deposits",
            Tool::HighBalance => "high_balance",
        }
    }

    /// Accepts canonical names and the longer `get_*` aliases.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "dormant_accounts" | "get_dormant_accounts" => Some(Tool::DormantAccounts),
            "dormant_with_large_tx" | "get_dormant_with_large_transactions" => {
                Some(Tool::DormantWithLargeTx)
            }
            "salary_deposits" | "get_accounts_with_salary_deposits" => Some(Tool::SalaryDeposits),
            "high_balance" | "get_accounts_with_high_balance" => Some(Tool::HighBalance),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::DormantAccounts => "Find accounts that are dormant (no transactions for N days)",
            Tool::DormantWithLargeTx => {
                "Find dormant accounts that had large transactions in the past"
            }
            Tool::SalaryDeposits => {
                "Find accounts with salary/deposit transactions above a threshold"
            }
            Tool::HighBalance => "Find accounts with balance above a threshold",
        }
    }

    /// JSON Schema of the tool's parameter object.
    pub fn input_schema(&self) -> Value {
        let days = json!({
            "type": "integer",
            "minimum": 0,
            "description": "Number of days of inactivity to consider dormant (default: 180)",
            "default": DEFAULT_DAYS_INACTIVE
        });
        let limit = json!({
            "type": "integer",
            "minimum": 0,
            "description": "Maximum number of records to return"
        });

        let properties = match self {
            Tool::DormantAccounts => json!({ "days_inactive": days, "limit": limit }),
            Tool::DormantWithLargeTx => json!({
                "days_inactive": days,
                "threshold_amount": {
                    "type": ["number", "string"],
                    "description": "Minimum transaction amount in dollars (default: 1000)",
                    "default": 1000.0
                },
                "limit": limit
            }),
            Tool::SalaryDeposits => json!({
                "min_amount": {
                    "type": ["number", "string"],
                    "description": "Minimum deposit amount in dollars (default: 500)",
                    "default": 500.0
                },
                "limit": limit
            }),
            Tool::HighBalance => json!({
                "min_balance": {
                    "type": ["number", "string"],
                    "description": "Minimum balance in dollars (default: 100000)",
                    "default": 100000.0
                },
                "limit": limit
            }),
        };

        json!({
            "type": "object",
            "properties": properties,
            "required": []
        })
    }

    /// Name, description and schema, as listed by `tools/list`.
    pub fn descriptor(&self) -> Value {
        json!({
            "name": self.as_str(),
            "description": self.description(),
            "inputSchema": self.input_schema()
        })
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DormantParams {
    #[serde(alias = "days")]
    pub days_inactive: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DormantLargeTxParams {
    #[serde(alias = "days")]
    pub days_inactive: Option<u32>,
    #[serde(alias = "amount", with = "crate::domain::money::option_cents_str")]
    pub threshold_amount: Option<Cents>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SalaryDepositParams {
    #[serde(alias = "threshold_amount", with = "crate::domain::money::option_cents_str")]
    pub min_amount: Option<Cents>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HighBalanceParams {
    #[serde(alias = "threshold_amount", with = "crate::domain::money::option_cents_str")]
    pub min_balance: Option<Cents>,
    pub limit: Option<usize>,
}

/// Result of one tool call.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutput {
    pub tool: Tool,
    pub summary: String,
    /// Matches found, before `limit` is applied
    pub count: usize,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::domain::money::option_cents_str"
    )]
    pub total_balance: Option<Cents>,
    pub data: Vec<Value>,
}

impl Serialize for Tool {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

fn parse_params<T: DeserializeOwned + Default>(arguments: Value) -> Result<T, ToolError> {
    match arguments {
        Value::Null => Ok(T::default()),
        Value::Object(_) => {
            serde_json::from_value(arguments).map_err(|e| ToolError::InvalidParams(e.to_string()))
        }
        other => Err(ToolError::InvalidParams(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

fn to_values<T: Serialize>(rows: &[T], limit: Option<usize>) -> Result<Vec<Value>, ToolError> {
    let take = limit.unwrap_or(rows.len());
    rows.iter()
        .take(take)
        .map(|row| {
            serde_json::to_value(row)
                .map_err(|e| ToolError::InvalidParams(format!("unserializable result: {}", e)))
        })
        .collect()
}

/// Look up a tool by name and run it.
pub fn call_tool(
    service: &BankService,
    name: &str,
    arguments: Value,
    now: DateTime<Utc>,
) -> Result<ToolOutput, ToolError> {
    let tool = Tool::from_str(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
    invoke(service, tool, arguments, now)
}

/// Run one tool against the service's current tables.
pub fn invoke(
    service: &BankService,
    tool: Tool,
    arguments: Value,
    now: DateTime<Utc>,
) -> Result<ToolOutput, ToolError> {
    match tool {
        Tool::DormantAccounts => {
            let params: DormantParams = parse_params(arguments)?;
            let days = params.days_inactive.unwrap_or(DEFAULT_DAYS_INACTIVE);
            let rows = service.dormant_accounts(days, now);
            Ok(ToolOutput {
                tool,
                summary: format!(
                    "Found {} dormant accounts (inactive >= {} days)",
                    rows.len(),
                    days
                ),
                count: rows.len(),
                total_balance: None,
                data: to_values(&rows, params.limit)?,
            })
        }
        Tool::DormantWithLargeTx => {
            let params: DormantLargeTxParams = parse_params(arguments)?;
            let days = params.days_inactive.unwrap_or(DEFAULT_DAYS_INACTIVE);
            let threshold = params
                .threshold_amount
                .unwrap_or(DEFAULT_LARGE_TX_THRESHOLD);
            let rows = service.dormant_with_large_transactions(days, threshold, now);
            Ok(ToolOutput {
                tool,
                summary: format!(
                    "Found {} dormant accounts (>= {} days) with past transactions >= ${}",
                    rows.len(),
                    days,
                    format_cents(threshold)
                ),
                count: rows.len(),
                total_balance: None,
                data: to_values(&rows, params.limit)?,
            })
        }
        Tool::SalaryDeposits => {
            let params: SalaryDepositParams = parse_params(arguments)?;
            let min_amount = params.min_amount.unwrap_or(DEFAULT_SALARY_MIN_AMOUNT);
            let rows = service.salary_deposit_accounts(min_amount);
            Ok(ToolOutput {
                tool,
                summary: format!(
                    "Found {} accounts with deposits >= ${}",
                    rows.len(),
                    format_cents(min_amount)
                ),
                count: rows.len(),
                total_balance: None,
                data: to_values(&rows, params.limit)?,
            })
        }
        Tool::HighBalance => {
            let params: HighBalanceParams = parse_params(arguments)?;
            let min_balance = params.min_balance.unwrap_or(DEFAULT_MIN_BALANCE);
            let rows = service.high_balance_accounts(min_balance);
            let total = checked_total(rows.iter().map(|a| a.balance)).ok_or_else(|| {
                AppError::InvalidAmount("total of matching balances out of range".to_string())
            })?;
            Ok(ToolOutput {
                tool,
                summary: format!(
                    "Found {} accounts with balance >= ${} (total ${})",
                    rows.len(),
                    format_cents(min_balance),
                    format_cents(total)
                ),
                count: rows.len(),
                total_balance: Some(total),
                data: to_values(&rows, params.limit)?,
            })
        }
    }
}
