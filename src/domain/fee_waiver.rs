use serde::{Deserialize, Serialize};

use super::{AccountStatus, Cents, percent_of};

const PREMIUM_BALANCE: Cents = 10_000_000;
const HIGH_BALANCE: Cents = 5_000_000;
const ACTIVE_USER_BALANCE: Cents = 1_000_000;
const ACTIVE_USER_TRANSACTIONS: u32 = 20;
const LONG_TENURE_MONTHS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaiverType {
    FullWaiver,
    PartialWaiver,
    PremiumWaiver,
    NoWaiver,
}

impl WaiverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaiverType::FullWaiver => "FULL_WAIVER",
            WaiverType::PartialWaiver => "PARTIAL_WAIVER",
            WaiverType::PremiumWaiver => "PREMIUM_WAIVER",
            WaiverType::NoWaiver => "NO_WAIVER",
        }
    }
}

impl std::fmt::Display for WaiverType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rules in evaluation order. The first matching rule decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaiverRule {
    #[serde(rename = "inactive_account_rule")]
    InactiveAccount,
    #[serde(rename = "new_customer_rule")]
    NewCustomer,
    #[serde(rename = "premium_customer_rule")]
    PremiumCustomer,
    #[serde(rename = "premium_waiver_rule")]
    PremiumWaiver,
    #[serde(rename = "high_balance_rule")]
    HighBalance,
    #[serde(rename = "active_user_rule")]
    ActiveUser,
    #[serde(rename = "long_tenure_rule")]
    LongTenure,
    #[serde(rename = "default_rule")]
    Default,
}

impl WaiverRule {
    pub const ORDER: [WaiverRule; 8] = [
        WaiverRule::InactiveAccount,
        WaiverRule::NewCustomer,
        WaiverRule::PremiumCustomer,
        WaiverRule::PremiumWaiver,
        WaiverRule::HighBalance,
        WaiverRule::ActiveUser,
        WaiverRule::LongTenure,
        WaiverRule::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WaiverRule::InactiveAccount => "inactive_account_rule",
            WaiverRule::NewCustomer => "new_customer_rule",
            WaiverRule::PremiumCustomer => "premium_customer_rule",
            WaiverRule::PremiumWaiver => "premium_waiver_rule",
            WaiverRule::HighBalance => "high_balance_rule",
            WaiverRule::ActiveUser => "active_user_rule",
            WaiverRule::LongTenure => "long_tenure_rule",
            WaiverRule::Default => "default_rule",
        }
    }

    pub fn matches(&self, req: &FeeWaiverRequest) -> bool {
        let balance = req.account_balance;
        match self {
            WaiverRule::InactiveAccount => !matches!(req.account_status, AccountStatus::Active),
            WaiverRule::NewCustomer => req.is_new_customer,
            WaiverRule::PremiumCustomer => req.is_premium_customer && balance >= PREMIUM_BALANCE,
            WaiverRule::PremiumWaiver => {
                req.is_premium_customer && (HIGH_BALANCE..PREMIUM_BALANCE).contains(&balance)
            }
            WaiverRule::HighBalance => (HIGH_BALANCE..PREMIUM_BALANCE).contains(&balance),
            WaiverRule::ActiveUser => {
                req.monthly_transaction_count >= ACTIVE_USER_TRANSACTIONS
                    && balance >= ACTIVE_USER_BALANCE
            }
            WaiverRule::LongTenure => {
                req.account_tenure_months >= LONG_TENURE_MONTHS
                    && req.account_status == AccountStatus::Active
            }
            WaiverRule::Default => true,
        }
    }

    fn decide(&self, req: &FeeWaiverRequest) -> Option<FeeWaiverDecision> {
        let yearly_maintenance = || req.monthly_maintenance_fee.checked_mul(12);
        let (waiver_type, annual, monthly, total, reason) = match self {
            WaiverRule::InactiveAccount => (
                WaiverType::NoWaiver,
                0,
                0,
                0,
                "Account not in active status",
            ),
            WaiverRule::NewCustomer => (
                WaiverType::FullWaiver,
                req.annual_fee,
                0,
                req.annual_fee,
                "New customer promotion",
            ),
            WaiverRule::PremiumCustomer => (
                WaiverType::FullWaiver,
                req.annual_fee,
                req.monthly_maintenance_fee,
                req.annual_fee.checked_add(yearly_maintenance()?)?,
                "Premium customer status with high balance",
            ),
            WaiverRule::PremiumWaiver => {
                let annual = percent_of(req.annual_fee, 75)?;
                (
                    WaiverType::PremiumWaiver,
                    annual,
                    req.monthly_maintenance_fee,
                    annual.checked_add(yearly_maintenance()?)?,
                    "Premium waiver: 75% annual fee + free monthly maintenance",
                )
            }
            WaiverRule::HighBalance => {
                let annual = percent_of(req.annual_fee, 50)?;
                (
                    WaiverType::PartialWaiver,
                    annual,
                    0,
                    annual,
                    "High balance threshold met (50k-100k)",
                )
            }
            WaiverRule::ActiveUser => {
                let annual = percent_of(req.annual_fee, 25)?;
                (
                    WaiverType::PartialWaiver,
                    annual,
                    0,
                    annual,
                    "High transaction activity (20+ monthly transactions)",
                )
            }
            WaiverRule::LongTenure => {
                let annual = percent_of(req.annual_fee, 20)?;
                (
                    WaiverType::PartialWaiver,
                    annual,
                    0,
                    annual,
                    "Long account tenure (5+ years)",
                )
            }
            WaiverRule::Default => (
                WaiverType::NoWaiver,
                0,
                0,
                0,
                "No eligibility criteria met",
            ),
        };

        Some(FeeWaiverDecision {
            account_id: req.account_id.clone(),
            waiver_type,
            annual_fee_waived: annual,
            monthly_fee_waived: monthly,
            total_waived: total,
            reason: reason.to_string(),
            rule_applied: *self,
            eligible: waiver_type != WaiverType::NoWaiver,
        })
    }
}

/// Inputs to a fee waiver decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeWaiverRequest {
    pub account_id: String,
    #[serde(with = "super::money::cents_str")]
    pub account_balance: Cents,
    pub monthly_transaction_count: u32,
    pub account_tenure_months: u32,
    pub account_status: AccountStatus,
    pub is_premium_customer: bool,
    pub is_new_customer: bool,
    #[serde(with = "super::money::cents_str")]
    pub annual_fee: Cents,
    #[serde(with = "super::money::cents_str")]
    pub monthly_maintenance_fee: Cents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeWaiverDecision {
    pub account_id: String,
    pub waiver_type: WaiverType,
    #[serde(with = "super::money::cents_str")]
    pub annual_fee_waived: Cents,
    #[serde(with = "super::money::cents_str")]
    pub monthly_fee_waived: Cents,
    #[serde(with = "super::money::cents_str")]
    pub total_waived: Cents,
    pub reason: String,
    pub rule_applied: WaiverRule,
    pub eligible: bool,
}

/// Evaluate the rule table with first-match hit policy.
///
/// `None` when the fees are too large for the waived totals to fit in `Cents`.
pub fn evaluate_fee_waiver(req: &FeeWaiverRequest) -> Option<FeeWaiverDecision> {
    let rule = WaiverRule::ORDER
        .iter()
        .find(|rule| rule.matches(req))
        .copied()
        .unwrap_or(WaiverRule::Default);
    rule.decide(req)
}
