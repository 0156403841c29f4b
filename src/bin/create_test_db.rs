use std::error::Error;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use time::{Duration, OffsetDateTime, Time};

use finance_tracker::{
    BackendPreference, Config, Transaction, TransactionType, select_backend, setup_logging,
    summarize,
};

/// A utility for seeding a finance_tracker data directory with sample transactions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The data directory to create the stores in.
    #[arg(long, short)]
    data_dir: PathBuf,

    /// How many transactions to create.
    #[arg(long, short, default_value_t = 50)]
    count: usize,

    /// Store the transactions in the key-value store instead of SQLite.
    #[arg(long)]
    key_value: bool,
}

const SAMPLES: [(&str, TransactionType, f64); 6] = [
    ("Salary", TransactionType::Income, 5000.0),
    ("Groceries", TransactionType::Expense, 85.4),
    ("Lunch", TransactionType::Expense, 12.5),
    ("Freelance work", TransactionType::Income, 750.0),
    ("Electricity bill", TransactionType::Expense, 64.3),
    ("Bus fare", TransactionType::Expense, 2.0),
];

/// Create a data directory with sample transactions for manual testing.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging(None)?;

    let args = Args::parse();

    if args.count == 0 {
        eprintln!("The count must be at least 1.");
        exit(1);
    }

    let backend = if args.key_value {
        BackendPreference::KeyValue
    } else {
        BackendPreference::Auto
    };
    let config = Config::with_data_dir(&args.data_dir).backend(backend);

    println!("Opening stores in {:#?}", args.data_dir);
    let storage = select_backend(&config);

    if !storage.transactions.list_transactions().await?.is_empty() {
        eprintln!("The data directory {:#?} already has transactions!", args.data_dir);
        exit(1);
    }

    println!("Creating {} transactions in the {} store...", args.count, storage.mode);

    let today = OffsetDateTime::now_utc().replace_time(Time::MIDNIGHT);

    for i in 0..args.count {
        let (description, kind, amount) = SAMPLES[i % SAMPLES.len()];
        let date = today - Duration::days(i as i64);

        storage
            .transactions
            .create_transaction(Transaction::build(amount, date, description, kind))
            .await?;
    }

    let summary = summarize(&storage.transactions.list_transactions().await?);
    println!(
        "Created {} transactions with a balance of {:.2}.",
        summary.transaction_count, summary.balance
    );

    println!("Success!");

    Ok(())
}
