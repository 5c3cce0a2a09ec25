use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::domain::{
    Account, AccountStatus, AccountType, BasisPoints, Cents, Customer, CustomerStatus,
    Transaction, TransactionType,
};
use crate::storage::{LedgerStore, StoreError};

pub const DEFAULT_CUSTOMERS: usize = 120;

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Christopher", "Nancy", "Daniel", "Lisa", "Matthew", "Betty", "Anthony",
    "Margaret", "Mark", "Sandra", "Donald", "Ashley", "Steven", "Kimberly", "Paul", "Emily",
    "Andrew", "Donna", "Joshua", "Michelle",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson",
];

const STREETS: &[&str] = &[
    "Main St", "Oak Ave", "Pine Rd", "Maple St", "Cedar Ln", "Elm St", "Birch Dr", "Walnut Ave",
];

const CITIES: &[&str] = &[
    "New York NY",
    "Los Angeles CA",
    "Chicago IL",
    "Houston TX",
    "Phoenix AZ",
    "Philadelphia PA",
    "San Antonio TX",
];

const CREDIT_DESCRIPTIONS: &[&str] = &["Salary Deposit", "Transfer In", "Interest Credit"];
const DEBIT_DESCRIPTIONS: &[&str] = &["ATM Withdrawal", "POS Purchase", "Transfer Out", "Fee"];

const CUSTOMER_STATUSES: &[(CustomerStatus, u32)] = &[
    (CustomerStatus::Active, 85),
    (CustomerStatus::Inactive, 10),
    (CustomerStatus::Closed, 5),
];

const ACCOUNT_STATUSES: &[(AccountStatus, u32)] = &[
    (AccountStatus::Active, 90),
    (AccountStatus::Frozen, 5),
    (AccountStatus::Closed, 5),
];

const ACCOUNT_TYPES: &[(AccountType, u32)] = &[
    (AccountType::Checking, 60),
    (AccountType::Savings, 30),
    (AccountType::MoneyMarket, 10),
];

/// Synthetic tables ready to be written with [`LedgerStore::seed`].
#[derive(Debug, Clone, Default)]
pub struct SampleData {
    pub customers: Vec<Customer>,
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

impl SampleData {
    pub fn write_to(self, store: &mut LedgerStore) -> Result<(), StoreError> {
        store.seed(self.customers, self.accounts, self.transactions)
    }
}

/// Deterministic generator of plausible banking data.
///
/// The same seed and `now` always produce the same tables. Foreign keys are
/// valid, every timestamp lies between its parent's creation and `now`, and
/// each account's `balance_after` chain ends at the account balance.
pub struct SampleDataGenerator {
    rng: StdRng,
    now: DateTime<Utc>,
    epoch: DateTime<Utc>,
}

impl SampleDataGenerator {
    pub fn new(seed: u64, now: DateTime<Utc>) -> Self {
        let epoch = Utc
            .with_ymd_and_hms(2019, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(now);
        Self {
            rng: StdRng::seed_from_u64(seed),
            now,
            epoch: epoch.min(now),
        }
    }

    pub fn generate(&mut self, customer_count: usize) -> SampleData {
        let customers = self.customers(customer_count);
        let accounts = self.accounts(&customers);
        let transactions = self.ledger(&accounts);

        info!(
            customers = customers.len(),
            accounts = accounts.len(),
            transactions = transactions.len(),
            "generated sample data"
        );

        SampleData {
            customers,
            accounts,
            transactions,
        }
    }

    fn customers(&mut self, count: usize) -> Vec<Customer> {
        (1..=count)
            .map(|i| {
                let first = self.pick(FIRST_NAMES);
                let last = self.pick(LAST_NAMES);
                let email = format!(
                    "{}.{}{}@example.com",
                    first.to_lowercase(),
                    last.to_lowercase(),
                    i
                );
                let phone = format!("555-{}", self.rng.gen_range(1000..=9999));
                let address = format!(
                    "{} {} {} {}",
                    self.rng.gen_range(10..=999),
                    self.pick(STREETS),
                    self.pick(CITIES),
                    self.rng.gen_range(10000..=99999)
                );

                let age_days = self.rng.gen_range(20 * 365..=70 * 365);
                let date_of_birth = (self.now - Duration::days(age_days)).date_naive();
                let created = self.between(self.epoch, self.now);
                let status = self.weighted(CUSTOMER_STATUSES);

                Customer::new(format!("C{:04}", i), first, last, date_of_birth)
                    .with_contact(email, phone, address)
                    .with_created_date(created)
                    .with_status(status)
            })
            .collect()
    }

    fn accounts(&mut self, customers: &[Customer]) -> Vec<Account> {
        let mut accounts = Vec::new();
        let mut n: u64 = 0;

        for customer in customers {
            for _ in 0..self.rng.gen_range(1..=3) {
                n += 1;
                let account_type = self.weighted(ACCOUNT_TYPES);
                let interest_rate: BasisPoints = match account_type {
                    AccountType::Checking => 0,
                    AccountType::Savings => self.rng.gen_range(10..=350),
                    AccountType::MoneyMarket => self.rng.gen_range(100..=400),
                };
                let balance: Cents = self.rng.gen_range(0..=20_000_000);
                let status = self.weighted(ACCOUNT_STATUSES);
                let opened = self.between(customer.created_date, self.now);

                let mut account = Account::new(
                    format!("A{:05}", n),
                    customer.customer_id.clone(),
                    account_type,
                    "USD",
                    balance,
                )
                .with_account_number((1_000_000_000 + n).to_string())
                .with_interest_rate(interest_rate)
                .with_status(status)
                .with_opened_date(opened);

                if status == AccountStatus::Closed {
                    let closed = self.between(opened, self.now);
                    account = account.with_closed_date(closed);
                }
                accounts.push(account);
            }
        }

        accounts
    }

    fn ledger(&mut self, accounts: &[Account]) -> Vec<Transaction> {
        let mut ledger = Vec::new();
        let mut n: u64 = 0;

        for account in accounts {
            // zero is twice as likely as any other count
            let count = if self.rng.gen_bool(2.0 / 22.0) {
                0
            } else {
                self.rng.gen_range(1..=20)
            };

            let until = account.closed_date.unwrap_or(self.now);
            let mut timestamps: Vec<DateTime<Utc>> = (0..count)
                .map(|_| self.between(account.opened_date, until))
                .collect();
            timestamps.sort();

            let mut entries = Vec::with_capacity(count);
            for timestamp in timestamps {
                n += 1;
                let transaction_type = if self.rng.gen_bool(0.5) {
                    TransactionType::Credit
                } else {
                    TransactionType::Debit
                };
                let amount: Cents = if self.rng.gen_bool(0.08) {
                    self.rng.gen_range(100_000..=5_000_000)
                } else {
                    self.rng.gen_range(100..=200_000)
                };
                let description = match transaction_type {
                    TransactionType::Credit => self.pick(CREDIT_DESCRIPTIONS),
                    TransactionType::Debit => self.pick(DEBIT_DESCRIPTIONS),
                };

                entries.push(
                    Transaction::new(
                        format!("T{:07}", n),
                        account.account_id.clone(),
                        transaction_type,
                        amount,
                        0,
                        timestamp,
                    )
                    .with_description(description),
                );
            }

            // Walk backwards from the current balance so the chain ends there.
            let mut running = account.balance;
            for entry in entries.iter_mut().rev() {
                entry.balance_after = running;
                running = match entry.transaction_type {
                    TransactionType::Credit => running - entry.amount,
                    TransactionType::Debit => running + entry.amount,
                };
            }

            ledger.extend(entries);
        }

        ledger.shuffle(&mut self.rng);
        ledger
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items[self.rng.gen_range(0..items.len())]
    }

    fn weighted<T: Copy>(&mut self, choices: &[(T, u32)]) -> T {
        let total: u32 = choices.iter().map(|(_, w)| w).sum();
        let mut roll = self.rng.gen_range(0..total);
        for (choice, weight) in choices {
            if roll < *weight {
                return *choice;
            }
            roll -= weight;
        }
        choices[0].0
    }

    fn between(&mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> DateTime<Utc> {
        let span = (to - from).num_seconds();
        if span <= 0 {
            return from;
        }
        from + Duration::seconds(self.rng.gen_range(0..=span))
    }
}
