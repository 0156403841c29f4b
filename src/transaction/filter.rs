//! Narrowing a list of transactions by type, description and date.

use std::str::FromStr;

use time::{Date, OffsetDateTime, UtcOffset, macros::time};

use crate::Error;

use super::core::{Transaction, TransactionType, parse_date, parse_timestamp};

/// Which transaction types pass a [TransactionFilter].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    /// Income and expenses.
    #[default]
    All,
    /// Only transactions of the given type.
    Only(TransactionType),
}

impl FromStr for TypeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TypeFilter::All),
            other => other.parse().map(TypeFilter::Only),
        }
    }
}

/// The predicates applied by [filter_transactions].
///
/// Every predicate that is set must pass. The default filter passes
/// everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionFilter {
    /// Restrict by transaction type.
    pub kind: TypeFilter,
    /// Case-insensitive text that must appear in the description.
    pub search: Option<String>,
    /// Earliest date (inclusive).
    pub date_from: Option<OffsetDateTime>,
    /// Latest date (inclusive).
    pub date_to: Option<OffsetDateTime>,
}

impl TransactionFilter {
    /// Set the type filter.
    pub fn kind(mut self, kind: TypeFilter) -> Self {
        self.kind = kind;
        self
    }

    /// Set the search text.
    pub fn search(mut self, search: &str) -> Self {
        self.search = Some(search.to_owned());
        self
    }

    /// Include transactions from the start of the calendar day `date` in
    /// the timezone at `offset` onwards.
    ///
    /// Use [crate::local_offset] for the user's timezone.
    pub fn from_date(mut self, date: Date, offset: UtcOffset) -> Self {
        self.date_from = Some(date.midnight().assume_offset(offset));
        self
    }

    /// Include transactions up to and including the last instant of the
    /// calendar day `date` in the timezone at `offset`.
    pub fn through_date(mut self, date: Date, offset: UtcOffset) -> Self {
        self.date_to = Some(
            date.with_time(time!(23:59:59.999_999_999))
                .assume_offset(offset),
        );
        self
    }

    /// Parse a lower bound from text.
    ///
    /// A bare `YYYY-MM-DD` date starts at midnight at `offset`, a full
    /// timestamp is used as is.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if `text` cannot be parsed.
    pub fn parse_date_from(self, text: &str, offset: UtcOffset) -> Result<Self, Error> {
        match parse_date(text) {
            Ok(date) => Ok(self.from_date(date, offset)),
            Err(_) => {
                let date_from = parse_timestamp(text)?;

                Ok(Self {
                    date_from: Some(date_from),
                    ..self
                })
            }
        }
    }

    /// Parse an upper bound from text.
    ///
    /// A bare `YYYY-MM-DD` date includes the whole day at `offset`, a full
    /// timestamp is used as is.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if `text` cannot be parsed.
    pub fn parse_date_to(self, text: &str, offset: UtcOffset) -> Result<Self, Error> {
        match parse_date(text) {
            Ok(date) => Ok(self.through_date(date, offset)),
            Err(_) => {
                let date_to = parse_timestamp(text)?;

                Ok(Self {
                    date_to: Some(date_to),
                    ..self
                })
            }
        }
    }

    /// Whether `transaction` passes every predicate.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let TypeFilter::Only(kind) = self.kind
            && transaction.kind != kind
        {
            return false;
        }

        if let Some(search) = self.search.as_deref().filter(|search| !search.is_empty())
            && !transaction
                .description
                .to_lowercase()
                .contains(&search.to_lowercase())
        {
            return false;
        }

        if self.date_from.is_some_and(|from| transaction.date < from) {
            return false;
        }

        if self.date_to.is_some_and(|to| transaction.date > to) {
            return false;
        }

        true
    }
}

/// Keep the transactions that pass `filter`, in their original order.
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: &TransactionFilter,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| filter.matches(transaction))
        .cloned()
        .collect()
}
