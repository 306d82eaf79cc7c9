//! Account transaction model populated by statement extractors.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::convert::{minor_to_decimal, DEFAULT_SCALE};

/// Classification of a cash movement on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money paid into the account.
    Deposit,
    /// Money withdrawn from the account.
    Removal,
    /// Interest credited.
    Interest,
    /// Interest charged.
    InterestCharge,
    /// Dividend payment.
    Dividends,
    /// Fees charged.
    Fees,
    /// Fees refunded.
    FeesRefund,
    /// Taxes withheld.
    Taxes,
    /// Taxes refunded.
    TaxRefund,
}

impl TransactionType {
    /// Upper-case name used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Removal => "REMOVAL",
            Self::Interest => "INTEREST",
            Self::InterestCharge => "INTEREST_CHARGE",
            Self::Dividends => "DIVIDENDS",
            Self::Fees => "FEES",
            Self::FeesRefund => "FEES_REFUND",
            Self::Taxes => "TAXES",
            Self::TaxRefund => "TAX_REFUND",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single account booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTransaction {
    /// Booking date.
    pub date: Option<NaiveDate>,

    /// Kind of booking.
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Amount in minor units (cents), always non-negative for bookings
    /// whose direction is given by `kind`.
    pub amount: i64,

    /// ISO 4217 currency code.
    pub currency: String,

    /// Free text from the statement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AccountTransaction {
    /// Create an empty booking of the given kind.
    pub fn new(kind: TransactionType) -> Self {
        Self {
            date: None,
            kind,
            amount: 0,
            currency: String::new(),
            note: None,
        }
    }

    /// Amount as a decimal value in major units.
    pub fn amount_decimal(&self) -> Decimal {
        minor_to_decimal(self.amount, DEFAULT_SCALE)
    }
}

/// One extracted output item, emitted per successfully parsed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum ExtractedItem {
    /// An account booking.
    Transaction(AccountTransaction),
}

impl ExtractedItem {
    /// The booking carried by this item, if any.
    pub fn transaction(&self) -> Option<&AccountTransaction> {
        match self {
            Self::Transaction(t) => Some(t),
        }
    }
}

impl From<AccountTransaction> for ExtractedItem {
    fn from(transaction: AccountTransaction) -> Self {
        Self::Transaction(transaction)
    }
}
