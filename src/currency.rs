//! Formatting amounts of money for display.

use numfmt::{Formatter, Precision};

use crate::{
    Error,
    transaction::{Transaction, TransactionType},
};

/// Formats amounts with a currency symbol, thousands separators and two
/// decimal places, e.g. "৳1,234.50".
#[derive(Debug, Clone)]
pub struct CurrencyFormatter {
    symbol: String,
    positive: Formatter,
    negative: Formatter,
}

impl CurrencyFormatter {
    /// Create a formatter that puts `symbol` before every amount.
    ///
    /// # Errors
    /// Returns [Error::InvalidCurrencySymbol] if the symbol is too long to be
    /// used as a prefix.
    pub fn new(symbol: &str) -> Result<Self, Error> {
        let invalid_symbol = |_| Error::InvalidCurrencySymbol(symbol.to_owned());

        let positive = Formatter::currency(symbol)
            .map_err(invalid_symbol)?
            .precision(Precision::Decimals(2));
        let negative = Formatter::currency(&format!("-{symbol}"))
            .map_err(invalid_symbol)?
            .precision(Precision::Decimals(2));

        Ok(Self {
            symbol: symbol.to_owned(),
            positive,
            negative,
        })
    }

    /// The currency symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Format `amount` with exactly two decimal places.
    ///
    /// Amounts that are not finite are shown as zero.
    pub fn format(&self, amount: f64) -> String {
        // numfmt renders zero as "0" without the prefix.
        if !amount.is_finite() || amount == 0.0 {
            return format!("{}0.00", self.symbol);
        }

        let mut formatted = if amount < 0.0 {
            self.negative.fmt_string(amount.abs())
        } else {
            self.positive.fmt_string(amount)
        };

        // numfmt drops trailing zeros, e.g. "12.30" is rendered as "12.3".
        let decimals = formatted
            .rfind('.')
            .map_or(0, |point| formatted.len() - point - 1);
        if decimals == 0 && !formatted.ends_with('.') {
            formatted.push('.');
        }
        for _ in decimals..2 {
            formatted.push('0');
        }

        formatted
    }

    /// Format the amount of `transaction` with "+" for income and "-" for
    /// expenses.
    pub fn format_signed(&self, transaction: &Transaction) -> String {
        let sign = match transaction.kind {
            TransactionType::Income => '+',
            TransactionType::Expense => '-',
        };

        format!("{sign}{}", self.format(transaction.amount_or_zero().abs()))
    }
}
