//! Defines the core data models for transactions.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _, ser::Error as _};
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction earned or spent money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money that was earned.
    Income,
    /// Money that was spent.
    Expense,
}

impl TransactionType {
    /// The lower case name used when persisting the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The label used when grouping amounts by category.
    pub fn category_label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }

    /// Read a type from persisted data.
    ///
    /// Anything other than "income" is counted as an expense, so records
    /// written with an unknown type still show up in the totals.
    pub(crate) fn from_stored(value: &str) -> Self {
        match value {
            "income" => TransactionType::Income,
            "expense" => TransactionType::Expense,
            other => {
                tracing::warn!("unknown transaction type \"{other}\" in storage, treating it as an expense");
                TransactionType::Expense
            }
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(value) => Ok(TransactionType::from_stored(&value)),
            other => {
                tracing::warn!("transaction type {other} in storage is not a string, treating it as an expense");
                Ok(TransactionType::Expense)
            }
        }
    }
}

fn missing_type() -> TransactionType {
    tracing::warn!("transaction without a type in storage, treating it as an expense");
    TransactionType::Expense
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned, always stored as a magnitude.
    ///
    /// Amounts read from older key-value data may be NaN when the stored
    /// value was not a number. Use [Transaction::amount_or_zero] when summing.
    #[serde(default = "missing_amount", deserialize_with = "deserialize_amount")]
    pub amount: f64,
    /// A text description of what the transaction was for.
    #[serde(default, deserialize_with = "deserialize_description")]
    pub description: String,
    /// When the transaction happened.
    #[serde(
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub date: OffsetDateTime,
    /// Whether the amount was earned or spent.
    #[serde(rename = "type", default = "missing_type")]
    pub kind: TransactionType,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: f64,
        date: OffsetDateTime,
        description: &str,
        kind: TransactionType,
    ) -> TransactionBuilder {
        TransactionBuilder {
            id: None,
            amount,
            date,
            description: description.to_owned(),
            kind,
        }
    }

    /// The amount, or zero if the stored amount is not a finite number.
    pub fn amount_or_zero(&self) -> f64 {
        if self.amount.is_finite() {
            self.amount
        } else {
            0.0
        }
    }

    /// Check the fields that can be replaced by an update.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is negative or not finite.
    pub fn validate(&self) -> Result<(), Error> {
        validate_amount(self.amount)
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use time::macros::datetime;
///
/// let builder = Transaction::build(
///         45.99,
///         datetime!(2025-01-15 12:30 UTC),
///         "Coffee",
///         TransactionType::Expense,
///     )
///     .id(Some(1736944200000));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// An ID chosen by the caller. Stores assign one when this is `None`.
    pub id: Option<TransactionId>,
    /// The magnitude of the transaction. Must be finite and not negative.
    pub amount: f64,
    /// When the transaction happened. Not necessarily "now".
    pub date: OffsetDateTime,
    /// What the transaction was for. Must not be blank.
    pub description: String,
    /// Whether the amount was earned or spent.
    pub kind: TransactionType,
}

impl TransactionBuilder {
    /// Set the ID for the transaction.
    pub fn id(mut self, id: Option<TransactionId>) -> Self {
        self.id = id;
        self
    }

    /// Check the builder before it is persisted.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] if the amount is negative or not finite,
    /// - or [Error::EmptyDescription] if the description is blank.
    pub fn validate(&self) -> Result<(), Error> {
        validate_amount(self.amount)?;

        if self.description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        Ok(())
    }

    /// Create the [Transaction] with its final `id`.
    pub fn finalise(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            description: self.description,
            date: self.date,
            kind: self.kind,
        }
    }
}

fn validate_amount(amount: f64) -> Result<(), Error> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidAmount(amount))
    }
}

// ============================================================================
// DATES
// ============================================================================

/// Parse a timestamp from an RFC 3339 string or a `YYYY-MM-DD` date.
///
/// Bare dates are interpreted as midnight UTC.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` matches neither format.
pub fn parse_timestamp(text: &str) -> Result<OffsetDateTime, Error> {
    let text = text.trim();

    if let Ok(timestamp) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(timestamp);
    }

    parse_date(text).map(|date| date.midnight().assume_utc())
}

/// Parse a `YYYY-MM-DD` date.
pub(crate) fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Format a timestamp as RFC 3339 in UTC, the persisted representation.
pub(crate) fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, Error> {
    timestamp
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|_| Error::InvalidDate(timestamp.to_string()))
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &OffsetDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let text = format_timestamp(*timestamp).map_err(S::Error::custom)?;
    serializer.serialize_str(&text)
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<OffsetDateTime, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text).map_err(D::Error::custom)
}

/// Accepts numbers, numeric strings and anything else, which becomes NaN.
fn deserialize_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;

    let amount = match &value {
        serde_json::Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(text) => text.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    };

    Ok(amount)
}

fn missing_amount() -> f64 {
    f64::NAN
}

/// Accepts strings, null (read as empty) and other values as their JSON text.
fn deserialize_description<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let description = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    };

    Ok(description)
}

// ============================================================================
// TESTS
// ============================================================================
