//! Transaction aggregation for the dashboard and analytics screens.
//!
//! Provides the totals, balance and per-category sums for a set of
//! transactions, plus the newest-first ordering shared by every list.

use std::collections::HashMap;

use super::core::{Transaction, TransactionType};

/// Figures derived from a set of transactions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    /// Sum of all income amounts.
    pub total_income: f64,
    /// Sum of all expense amounts.
    pub total_expense: f64,
    /// `total_income - total_expense`.
    pub balance: f64,
    /// How many transactions were summarized.
    pub transaction_count: usize,
    /// Summed amounts keyed by "Income" or "Expense".
    ///
    /// A label only appears if at least one transaction of that type exists.
    pub by_category: HashMap<String, f64>,
    /// The transactions, newest first.
    pub recent: Vec<Transaction>,
}

/// Compute the totals, balance and category sums for `transactions`.
///
/// Amounts that are not finite numbers count as zero. The scalar figures do
/// not depend on the order of `transactions`.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut total_income = 0.0;
    let mut total_expense = 0.0;
    let mut by_category: HashMap<String, f64> = HashMap::new();

    for transaction in transactions {
        let amount = transaction.amount_or_zero();

        match transaction.kind {
            TransactionType::Income => total_income += amount,
            TransactionType::Expense => total_expense += amount,
        }

        *by_category
            .entry(transaction.kind.category_label().to_owned())
            .or_insert(0.0) += amount;
    }

    let mut recent = transactions.to_vec();
    sort_newest_first(&mut recent);

    Summary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        transaction_count: transactions.len(),
        by_category,
        recent,
    }
}

/// The net of all income minus all expenses in `transactions`.
pub fn balance_of(transactions: &[Transaction]) -> f64 {
    let (income, expense) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expense), transaction| {
                match transaction.kind {
                    TransactionType::Income => (income + transaction.amount_or_zero(), expense),
                    TransactionType::Expense => (income, expense + transaction.amount_or_zero()),
                }
            });

    income - expense
}

/// Sort by date, newest first.
///
/// The sort is stable, so transactions with the same date keep their
/// relative order.
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Sort into the order every store lists transactions in: newest date first,
/// and the larger ID first among equal dates.
///
/// Stores assign increasing IDs, so ties list the most recently created
/// transaction first.
pub(crate) fn sort_for_listing(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| (b.date, b.id).cmp(&(a.date, a.id)));
}
