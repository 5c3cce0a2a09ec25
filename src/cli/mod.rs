use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::application::{BankService, FeeSchedule};
use crate::domain::{
    Account, AccountStatus, AccountType, Cents, Customer, CustomerStatus, TransactionType,
    checked_total, format_cents, format_rate, format_timestamp, parse_cents, parse_rate,
};
use crate::io::{DEFAULT_CUSTOMERS, SampleDataGenerator, write_dormant_report, write_snapshot};
use crate::storage::StoreConfig;
use crate::tools::{StdioServer, call_tool};

/// Ledger Store - simulated core-banking data over CSV tables
#[derive(Parser)]
#[command(name = "ledger-store")]
#[command(about = "Customers, accounts and a transaction ledger in flat CSV files, with analytical queries")]
#[command(version)]
pub struct Cli {
    /// Directory holding customers.csv, accounts.csv and ledger.csv
    #[arg(long, env = "LEDGER_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and empty tables
    Init,

    /// Replace all tables with generated sample data
    Generate {
        /// Number of customers to generate
        #[arg(short, long, default_value_t = DEFAULT_CUSTOMERS)]
        customers: usize,

        /// Random seed (same seed, same data)
        #[arg(short, long, default_value_t = 42)]
        seed: u64,

        /// Overwrite tables that already hold records
        #[arg(long)]
        force: bool,
    },

    /// Customer management commands
    #[command(subcommand)]
    Customer(CustomerCommands),

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Ledger commands
    #[command(subcommand)]
    Transaction(TransactionCommands),

    /// List dormant accounts
    Dormant {
        /// Days without activity
        #[arg(short, long, default_value_t = 180)]
        days: u32,

        /// Maximum number of accounts to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "table", value_parser = ["table", "json", "csv"])]
        format: String,
    },

    /// List dormant accounts that once had a large transaction
    DormantLargeTx {
        /// Days without activity
        #[arg(short, long, default_value_t = 180)]
        days: u32,

        /// Minimum transaction amount (e.g., "1000" or "1000.00")
        #[arg(short, long, default_value = "1000")]
        threshold: String,

        /// Also write the CSV report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table", value_parser = ["table", "json", "csv"])]
        format: String,
    },

    /// List accounts that received deposits above a threshold
    Salary {
        /// Minimum credit amount
        #[arg(short, long, default_value = "500")]
        min_amount: String,

        /// Output format
        #[arg(short, long, default_value = "table", value_parser = ["table", "json", "csv"])]
        format: String,
    },

    /// List accounts with a balance above a threshold, highest first
    HighBalance {
        /// Minimum balance
        #[arg(short, long, default_value = "100000")]
        min_balance: String,

        /// Output format
        #[arg(short, long, default_value = "table", value_parser = ["table", "json", "csv"])]
        format: String,
    },

    /// Evaluate fee waiver rules for an account
    FeeWaiver {
        /// Account ID
        account: String,

        /// Annual fee charged to the account
        #[arg(long, default_value = "0")]
        annual_fee: String,

        /// Monthly maintenance fee
        #[arg(long, default_value = "0")]
        monthly_fee: String,

        /// Treat the owner as a premium customer
        #[arg(long)]
        premium: bool,

        /// Output format
        #[arg(short, long, default_value = "table", value_parser = ["table", "json"])]
        format: String,
    },

    /// Verify references between tables
    Check,

    /// Export all tables as a JSON snapshot
    Export {
        /// Output file (omit for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run one analytical tool and print its JSON result
    Tool {
        /// Tool name (e.g., dormant_accounts, high_balance)
        name: String,

        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },

    /// Serve the analytical tools as JSON-RPC over stdin/stdout
    Serve,
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Add a customer
    Add {
        /// Customer ID (e.g., C0121)
        id: String,

        /// First name
        #[arg(long)]
        first_name: String,

        /// Last name
        #[arg(long)]
        last_name: String,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long, default_value = "")]
        address: String,
    },

    /// List customers
    List {
        /// Only customers with this status (active, inactive, closed)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show a customer with their accounts
    Show {
        /// Customer ID
        id: String,
    },

    /// Change a customer's status
    Status {
        /// Customer ID
        id: String,

        /// New status (active, inactive, closed)
        status: String,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open an account for an existing customer
    Add {
        /// Account ID (e.g., A00250)
        id: String,

        /// Owning customer ID
        #[arg(long)]
        customer: String,

        /// Account type: checking, savings, money-market
        #[arg(short = 't', long = "type", default_value = "checking")]
        account_type: String,

        /// Opening balance
        #[arg(long, default_value = "0")]
        balance: String,

        /// Annual interest rate in percent (e.g., "2.35")
        #[arg(long, default_value = "0")]
        rate: String,

        #[arg(long, default_value = "USD")]
        currency: String,

        /// External account number
        #[arg(long)]
        number: Option<String>,
    },

    /// List accounts
    List {
        /// Only accounts of this customer
        #[arg(long)]
        customer: Option<String>,
    },

    /// Show an account with its recent transactions
    Show {
        /// Account ID
        id: String,

        /// Number of recent transactions to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Change an account's status
    Status {
        /// Account ID
        id: String,

        /// New status (active, frozen, closed)
        status: String,
    },
}

#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Post a credit or debit and update the balance
    Record {
        /// Account ID
        account: String,

        /// credit or debit
        kind: String,

        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Description of the transaction
        #[arg(short, long)]
        description: Option<String>,

        /// Related transaction ID
        #[arg(long)]
        reference: Option<String>,

        /// Date of the transaction (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// List an account's transactions
    List {
        /// Account ID
        account: String,

        /// Only the most recent N transactions
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

impl Cli {
    fn config(&self) -> StoreConfig {
        StoreConfig::new(&self.data_dir)
    }

    fn open_service(&self) -> Result<BankService> {
        BankService::open(self.config()).with_context(|| {
            format!(
                "Failed to open data directory {} (run `ledger-store init` first?)",
                self.data_dir.display()
            )
        })
    }

    pub async fn run(self) -> Result<()> {
        match &self.command {
            Commands::Init => {
                let service = BankService::init(self.config())?;
                let report = service.check_integrity();
                println!(
                    "Data directory initialized: {} ({} customers, {} accounts, {} transactions)",
                    self.data_dir.display(),
                    report.customers,
                    report.accounts,
                    report.transactions
                );
            }

            Commands::Generate {
                customers,
                seed,
                force,
            } => {
                let mut service = BankService::init(self.config())?;
                let report = service.check_integrity();
                if report.customers + report.accounts + report.transactions > 0 && !force {
                    anyhow::bail!(
                        "{} already holds data; pass --force to overwrite it",
                        self.data_dir.display()
                    );
                }

                let data = SampleDataGenerator::new(*seed, Utc::now()).generate(*customers);
                let counts = (data.customers.len(), data.accounts.len(), data.transactions.len());
                data.write_to(service.store_mut())
                    .context("Failed to write sample data")?;

                println!(
                    "Generated {} customers, {} accounts, {} transactions in {}",
                    counts.0,
                    counts.1,
                    counts.2,
                    self.data_dir.display()
                );
            }

            Commands::Customer(cmd) => {
                let mut service = self.open_service()?;
                run_customer_command(&mut service, cmd)?;
            }

            Commands::Account(cmd) => {
                let mut service = self.open_service()?;
                run_account_command(&mut service, cmd)?;
            }

            Commands::Transaction(cmd) => {
                let mut service = self.open_service()?;
                run_transaction_command(&mut service, cmd)?;
            }

            Commands::Dormant {
                days,
                limit,
                format,
            } => {
                let service = self.open_service()?;
                run_dormant_command(&service, *days, *limit, format)?;
            }

            Commands::DormantLargeTx {
                days,
                threshold,
                output,
                format,
            } => {
                let service = self.open_service()?;
                let threshold = parse_amount(threshold)?;
                run_dormant_large_tx_command(&service, *days, threshold, output.as_ref(), format)?;
            }

            Commands::Salary { min_amount, format } => {
                let service = self.open_service()?;
                let min_amount = parse_amount(min_amount)?;
                run_salary_command(&service, min_amount, format)?;
            }

            Commands::HighBalance {
                min_balance,
                format,
            } => {
                let service = self.open_service()?;
                let min_balance = parse_amount(min_balance)?;
                run_high_balance_command(&service, min_balance, format)?;
            }

            Commands::FeeWaiver {
                account,
                annual_fee,
                monthly_fee,
                premium,
                format,
            } => {
                let service = self.open_service()?;
                let schedule = FeeSchedule {
                    annual_fee: parse_amount(annual_fee)?,
                    monthly_fee: parse_amount(monthly_fee)?,
                    premium: *premium,
                };
                run_fee_waiver_command(&service, account, schedule, format)?;
            }

            Commands::Check => {
                let service = self.open_service()?;
                run_check_command(&service)?;
            }

            Commands::Export { output } => {
                let service = self.open_service()?;
                match output {
                    Some(path) => {
                        let file = File::create(path)
                            .with_context(|| format!("Failed to create {}", path.display()))?;
                        let snapshot = write_snapshot(&service, Utc::now(), BufWriter::new(file))?;
                        eprintln!(
                            "Exported {} customers, {} accounts, {} transactions to {}",
                            snapshot.customers.len(),
                            snapshot.accounts.len(),
                            snapshot.transactions.len(),
                            path.display()
                        );
                    }
                    None => {
                        write_snapshot(&service, Utc::now(), stdout().lock())?;
                    }
                }
            }

            Commands::Tool { name, args } => {
                let service = self.open_service()?;
                let arguments: serde_json::Value =
                    serde_json::from_str(args).context("Tool arguments must be valid JSON")?;
                let output = call_tool(&service, name, arguments, Utc::now())?;
                println!("{}", serde_json::to_string_pretty(&output)?);
            }

            Commands::Serve => {
                let service = self.open_service()?;
                let mut server = StdioServer::new(service);
                let reader = tokio::io::BufReader::new(tokio::io::stdin());
                server.run(reader, tokio::io::stdout()).await?;
            }
        }

        Ok(())
    }
}

fn run_customer_command(service: &mut BankService, cmd: &CustomerCommands) -> Result<()> {
    match cmd {
        CustomerCommands::Add {
            id,
            first_name,
            last_name,
            dob,
            email,
            phone,
            address,
        } => {
            let dob = NaiveDate::parse_from_str(dob, "%Y-%m-%d")
                .context("Date of birth must be in YYYY-MM-DD format")?;
            let customer = service.add_customer(
                Customer::new(id.as_str(), first_name.as_str(), last_name.as_str(), dob)
                    .with_contact(email.as_str(), phone.as_str(), address.as_str()),
            )?;
            println!(
                "Added customer: {} ({})",
                customer.customer_id,
                customer.full_name()
            );
        }

        CustomerCommands::List { status } => {
            let status = status
                .as_deref()
                .map(|s| {
                    CustomerStatus::from_str(s).ok_or_else(|| {
                        anyhow::anyhow!(
                            "Invalid customer status '{}'. Valid: active, inactive, closed",
                            s
                        )
                    })
                })
                .transpose()?;

            let customers = service.list_customers(status);
            if customers.is_empty() {
                println!("No customers found.");
            } else {
                println!(
                    "{:<8} {:<24} {:<32} {:<10}",
                    "ID", "NAME", "EMAIL", "STATUS"
                );
                println!("{}", "-".repeat(77));
                for c in &customers {
                    println!(
                        "{:<8} {:<24} {:<32} {:<10}",
                        c.customer_id,
                        truncate(&c.full_name(), 24),
                        truncate(&c.email, 32),
                        c.status
                    );
                }
                println!("{}", "-".repeat(77));
                println!("{} customers", customers.len());
            }
        }

        CustomerCommands::Show { id } => {
            let summary = service.customer_summary(id)?;
            let c = &summary.customer;

            println!("Customer: {}", c.customer_id);
            println!("  Name:          {}", c.full_name());
            println!("  Status:        {}", c.status);
            println!("  Date of birth: {}", c.date_of_birth.format("%Y-%m-%d"));
            if !c.email.is_empty() {
                println!("  Email:         {}", c.email);
            }
            if !c.phone.is_empty() {
                println!("  Phone:         {}", c.phone);
            }
            if !c.address.is_empty() {
                println!("  Address:       {}", c.address);
            }
            println!(
                "  Created:       {}",
                c.created_date.format("%Y-%m-%d %H:%M:%S")
            );
            println!();
            println!(
                "  Accounts:      {} (total balance {})",
                summary.account_count,
                format_cents(summary.total_balance)
            );
            for a in &summary.accounts {
                println!(
                    "    {:<8} {:<13} {:>14} {} {}",
                    a.account_id,
                    a.account_type,
                    format_cents(a.balance),
                    a.currency,
                    a.status
                );
            }
        }

        CustomerCommands::Status { id, status } => {
            let status = CustomerStatus::from_str(status).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid customer status '{}'. Valid: active, inactive, closed",
                    status
                )
            })?;
            let customer = service.set_customer_status(id, status)?;
            println!("Customer {} is now {}", customer.customer_id, customer.status);
        }
    }
    Ok(())
}

fn run_account_command(service: &mut BankService, cmd: &AccountCommands) -> Result<()> {
    match cmd {
        AccountCommands::Add {
            id,
            customer,
            account_type,
            balance,
            rate,
            currency,
            number,
        } => {
            let at = AccountType::from_str(account_type).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid account type '{}'. Valid types: checking, savings, money-market",
                    account_type
                )
            })?;
            let balance = parse_amount(balance)?;
            let rate = parse_rate(rate).context("Invalid interest rate. Use '2.35' or '0'")?;

            let mut account = Account::new(id.as_str(), customer.as_str(), at, currency.as_str(), balance)
                .with_interest_rate(rate);
            if let Some(number) = number {
                account = account.with_account_number(number.as_str());
            }

            let account = service.add_account(account)?;
            println!(
                "Opened account: {} ({}) for {} with balance {}",
                account.account_id,
                account.account_type,
                account.customer_id,
                format_cents(account.balance)
            );
        }

        AccountCommands::List { customer } => {
            let accounts = service.list_accounts(customer.as_deref())?;
            if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                print_accounts(&accounts);
            }
        }

        AccountCommands::Show { id, limit } => {
            let summary = service.account_summary(id)?;
            let a = &summary.account;

            println!("Account: {}", a.account_id);
            println!("  Customer:      {}", a.customer_id);
            println!("  Type:          {}", a.account_type);
            if !a.account_number.is_empty() {
                println!("  Number:        {}", a.account_number);
            }
            println!("  Status:        {}", a.status);
            println!("  Interest rate: {}%", format_rate(a.interest_rate));
            println!("  Opened:        {}", a.opened_date.format("%Y-%m-%d %H:%M:%S"));
            if let Some(closed) = a.closed_date {
                println!("  Closed:        {}", closed.format("%Y-%m-%d %H:%M:%S"));
            }
            println!();
            println!(
                "  Balance:       {} {}",
                format_cents(summary.current_balance),
                a.currency
            );
            println!("  Transactions:  {}", summary.transaction_count);

            let skip = summary.transactions.len().saturating_sub(*limit);
            for t in summary.transactions.iter().skip(skip) {
                println!(
                    "    {} {:<10} {:<7} {:>12} {:>14}  {}",
                    t.timestamp.format("%Y-%m-%d"),
                    t.transaction_id,
                    t.transaction_type,
                    format_cents(t.amount),
                    format_cents(t.balance_after),
                    truncate(&t.description, 30)
                );
            }
        }

        AccountCommands::Status { id, status } => {
            let status = AccountStatus::from_str(status).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid account status '{}'. Valid: active, frozen, closed",
                    status
                )
            })?;
            let account = service.set_account_status(id, status, Utc::now())?;
            println!("Account {} is now {}", account.account_id, account.status);
        }
    }
    Ok(())
}

fn run_transaction_command(service: &mut BankService, cmd: &TransactionCommands) -> Result<()> {
    match cmd {
        TransactionCommands::Record {
            account,
            kind,
            amount,
            description,
            reference,
            date,
        } => {
            let tx_type = TransactionType::from_str(kind).ok_or_else(|| {
                anyhow::anyhow!("Invalid transaction type '{}'. Use credit or debit", kind)
            })?;
            let amount = parse_amount(amount)?;
            let timestamp = match date {
                Some(date_str) => parse_date(date_str).with_context(|| {
                    format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                })?,
                None => Utc::now(),
            };

            let tx = service.record_transaction(
                account,
                tx_type,
                amount,
                description.clone(),
                reference.clone(),
                timestamp,
            )?;
            println!(
                "Recorded {} {} on {} ({}), balance {}",
                tx.transaction_type,
                format_cents(tx.amount),
                tx.account_id,
                tx.transaction_id,
                format_cents(tx.balance_after)
            );
        }

        TransactionCommands::List { account, limit } => {
            let transactions = service.list_transactions(account, *limit)?;
            if transactions.is_empty() {
                println!("No transactions found.");
            } else {
                println!(
                    "{:<20} {:<10} {:<7} {:>12} {:>14} {:<10} DESCRIPTION",
                    "DATE", "ID", "TYPE", "AMOUNT", "BALANCE", "STATUS"
                );
                println!("{}", "-".repeat(100));
                for t in &transactions {
                    println!(
                        "{:<20} {:<10} {:<7} {:>12} {:>14} {:<10} {}",
                        t.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        t.transaction_id,
                        t.transaction_type,
                        format_cents(t.amount),
                        format_cents(t.balance_after),
                        t.status,
                        truncate(&t.description, 30)
                    );
                }
            }
        }
    }
    Ok(())
}

fn run_dormant_command(
    service: &BankService,
    days: u32,
    limit: Option<usize>,
    format: &str,
) -> Result<()> {
    let mut rows = service.dormant_accounts(days, Utc::now());
    let total = rows.len();
    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&rows)?),
        "csv" => {
            println!("account_id,customer_id,status,last_activity,days_inactive,balance");
            for r in &rows {
                println!(
                    "{},{},{},{},{},{}",
                    r.account.account_id,
                    r.account.customer_id,
                    r.account.status,
                    format_timestamp(&r.last_activity),
                    r.days_inactive,
                    format_cents(r.account.balance)
                );
            }
        }
        _ => {
            println!("Dormant accounts (no activity for {}+ days)", days);
            println!();
            println!(
                "{:<8} {:<8} {:<8} {:<12} {:>6} {:>14}",
                "ACCOUNT", "CUSTOMER", "STATUS", "LAST ACTIVE", "DAYS", "BALANCE"
            );
            println!("{}", "-".repeat(61));
            for r in &rows {
                let marker = if r.last_transaction.is_none() { "*" } else { "" };
                println!(
                    "{:<8} {:<8} {:<8} {:<12} {:>6} {:>14}",
                    r.account.account_id,
                    r.account.customer_id,
                    r.account.status,
                    format!("{}{}", r.last_activity.format("%Y-%m-%d"), marker),
                    r.days_inactive,
                    format_cents(r.account.balance)
                );
            }
            println!("{}", "-".repeat(61));
            println!("{} of {} accounts shown (* = never transacted)", rows.len(), total);
        }
    }
    Ok(())
}

fn run_dormant_large_tx_command(
    service: &BankService,
    days: u32,
    threshold: Cents,
    output: Option<&PathBuf>,
    format: &str,
) -> Result<()> {
    let rows = service.dormant_with_large_transactions(days, threshold, Utc::now());

    if let Some(path) = output {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let written = write_dormant_report(&rows, BufWriter::new(file))?;
        eprintln!("Wrote report: {} ({} rows)", path.display(), written);
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&rows)?),
        "csv" => {
            let mut out = stdout().lock();
            write_dormant_report(&rows, &mut out)?;
            out.flush()?;
        }
        _ => {
            println!(
                "Dormant accounts ({}+ days) with past transactions >= {}",
                days,
                format_cents(threshold)
            );
            println!();
            println!(
                "{:<8} {:<8} {:<12} {:>6} {:>14} {:>14}",
                "ACCOUNT", "CUSTOMER", "LAST TX", "DAYS", "LARGEST", "BALANCE"
            );
            println!("{}", "-".repeat(67));
            for r in &rows {
                let last = r
                    .dormant
                    .last_transaction
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                println!(
                    "{:<8} {:<8} {:<12} {:>6} {:>14} {:>14}",
                    r.dormant.account.account_id,
                    r.dormant.account.customer_id,
                    last,
                    r.dormant.days_inactive,
                    format_cents(r.largest_transaction_amount),
                    format_cents(r.dormant.account.balance)
                );
            }
            println!("{}", "-".repeat(67));
            println!("{} accounts", rows.len());
        }
    }
    Ok(())
}

fn run_salary_command(service: &BankService, min_amount: Cents, format: &str) -> Result<()> {
    let rows = service.salary_deposit_accounts(min_amount);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&rows)?),
        "csv" => {
            println!("account_id,customer_id,deposit_count,max_deposit,balance");
            for r in &rows {
                println!(
                    "{},{},{},{},{}",
                    r.account.account_id,
                    r.account.customer_id,
                    r.deposit_count,
                    format_cents(r.max_deposit),
                    format_cents(r.account.balance)
                );
            }
        }
        _ => {
            println!("Accounts with deposits >= {}", format_cents(min_amount));
            println!();
            println!(
                "{:<8} {:<8} {:>8} {:>14} {:>14}",
                "ACCOUNT", "CUSTOMER", "DEPOSITS", "LARGEST", "BALANCE"
            );
            println!("{}", "-".repeat(56));
            for r in &rows {
                println!(
                    "{:<8} {:<8} {:>8} {:>14} {:>14}",
                    r.account.account_id,
                    r.account.customer_id,
                    r.deposit_count,
                    format_cents(r.max_deposit),
                    format_cents(r.account.balance)
                );
            }
            println!("{}", "-".repeat(56));
            println!("{} accounts", rows.len());
        }
    }
    Ok(())
}

fn run_high_balance_command(service: &BankService, min_balance: Cents, format: &str) -> Result<()> {
    let rows = service.high_balance_accounts(min_balance);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&rows)?),
        "csv" => {
            println!("account_id,customer_id,account_type,status,balance");
            for a in &rows {
                println!(
                    "{},{},{},{},{}",
                    a.account_id,
                    a.customer_id,
                    a.account_type,
                    a.status,
                    format_cents(a.balance)
                );
            }
        }
        _ => {
            println!("Accounts with balance >= {}", format_cents(min_balance));
            println!();
            print_accounts(&rows);
            let total = checked_total(rows.iter().map(|a| a.balance))
                .context("Total balance is out of range")?;
            println!("{:<47} {:>14}", "TOTAL", format_cents(total));
        }
    }
    Ok(())
}

fn run_fee_waiver_command(
    service: &BankService,
    account_id: &str,
    schedule: FeeSchedule,
    format: &str,
) -> Result<()> {
    let decision = service.fee_waiver(account_id, schedule, Utc::now())?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&decision)?);
        return Ok(());
    }

    println!("Fee waiver for {}", decision.account_id);
    println!("  Rule:          {}", decision.rule_applied.as_str());
    println!("  Waiver:        {}", decision.waiver_type);
    println!("  Reason:        {}", decision.reason);
    println!("  Annual waived: {}", format_cents(decision.annual_fee_waived));
    println!("  Monthly waived: {}", format_cents(decision.monthly_fee_waived));
    println!("  Total waived:  {}", format_cents(decision.total_waived));
    println!(
        "  Eligible:      {}",
        if decision.eligible { "yes" } else { "no" }
    );
    Ok(())
}

fn run_check_command(service: &BankService) -> Result<()> {
    println!("Checking table integrity...\n");

    let report = service.check_integrity();

    println!("Customers:    {}", report.customers);
    println!("Accounts:     {}", report.accounts);
    println!("Transactions: {}", report.transactions);
    println!();

    if report.is_ok() {
        println!("All references are valid.");
        return Ok(());
    }

    println!("Issues found:");
    for id in &report.orphan_accounts {
        println!("  - account {} references a missing customer", id);
    }
    for id in &report.orphan_transactions {
        println!("  - transaction {} references a missing account", id);
    }
    anyhow::bail!("Integrity check failed");
}

fn print_accounts(accounts: &[Account]) {
    println!(
        "{:<8} {:<8} {:<13} {:<8} {:>7} {:>14} {:<4}",
        "ACCOUNT", "CUSTOMER", "TYPE", "STATUS", "RATE", "BALANCE", "CCY"
    );
    println!("{}", "-".repeat(68));
    for a in accounts {
        println!(
            "{:<8} {:<8} {:<13} {:<8} {:>7} {:>14} {:<4}",
            a.account_id,
            a.customer_id,
            a.account_type,
            a.status,
            format_rate(a.interest_rate),
            format_cents(a.balance),
            a.currency
        );
    }
    println!("{}", "-".repeat(68));
}

fn parse_amount(amount: &str) -> Result<Cents> {
    parse_cents(amount)
        .with_context(|| format!("Invalid amount '{}'. Use '50.00' or '50'", amount))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    let naive_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")?;

    let naive_datetime = naive_date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;

    Ok(DateTime::from_naive_utc_and_offset(naive_datetime, Utc))
}
