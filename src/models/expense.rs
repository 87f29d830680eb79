//! Expense model
//!
//! A single ledger entry: categorized, GST-annotated, attributed to a vehicle,
//! and optionally linked to one or more bank feed transactions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{BankTxnId, ExpenseId, VehicleId};
use super::money::Money;
use super::taxonomy::{ExpenseCategory, Taxonomy};

/// Tag carried by every expense materialized from a transaction split
pub const SPLIT_TAG: &str = "split-entry";

/// How an expense was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[serde(rename = "Bank Transfer")]
    #[default]
    BankTransfer,
    Cash,
    Fastag,
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "UPI")]
    Upi,
}

impl PaymentMethod {
    /// All methods in display order
    pub fn all() -> &'static [Self] {
        &[
            Self::BankTransfer,
            Self::Cash,
            Self::Fastag,
            Self::CreditCard,
            Self::Upi,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BankTransfer => "Bank Transfer",
            Self::Cash => "Cash",
            Self::Fastag => "Fastag",
            Self::CreditCard => "Credit Card",
            Self::Upi => "UPI",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::all()
            .iter()
            .find(|m| m.name().to_lowercase() == normalized)
            .copied()
            .ok_or_else(|| format!("unknown payment method: {}", s))
    }
}

/// A single fleet expense record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier, immutable once created
    pub id: ExpenseId,

    /// Expense date
    pub date: NaiveDate,

    /// Gross (tax-inclusive) amount, never negative
    pub amount: Money,

    /// Expense category
    pub category: ExpenseCategory,

    /// Sub-category; must belong to the category's allowed set
    pub sub_category: String,

    /// The vehicle this expense is attributed to
    pub vehicle_id: VehicleId,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Vendor name, when known
    pub vendor: Option<String>,

    /// GST amount paid, `0 <= tax_amount <= amount`
    #[serde(default)]
    pub tax_amount: Money,

    /// GST rate in percent; a standard slab, or 0 when manually overridden
    #[serde(default)]
    pub tax_rate: u8,

    /// Supplier invoice number, when captured
    pub invoice_number: Option<String>,

    /// Whether a copy of the invoice is on file
    #[serde(default)]
    pub has_invoice_copy: bool,

    /// How the expense was paid
    #[serde(default)]
    pub payment_method: PaymentMethod,

    /// True when this record originated from a bank feed transaction
    #[serde(default)]
    pub from_bank_feed: bool,

    /// Bank transactions this record accounts for. Empty for manual entries,
    /// one entry for direct links, one shared id across siblings for splits.
    #[serde(default)]
    pub linked_bank_txn_ids: Vec<BankTxnId>,

    /// Free-form tags (e.g. "split-entry")
    #[serde(default)]
    pub tags: Vec<String>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last modified
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new manual expense
    pub fn new(
        date: NaiveDate,
        amount: Money,
        category: ExpenseCategory,
        sub_category: impl Into<String>,
        vehicle_id: VehicleId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            date,
            amount,
            category,
            sub_category: sub_category.into(),
            vehicle_id,
            description: String::new(),
            vendor: None,
            tax_amount: Money::zero(),
            tax_rate: 0,
            invoice_number: None,
            has_invoice_copy: false,
            payment_method: PaymentMethod::default(),
            from_bank_feed: false,
            linked_bank_txn_ids: Vec::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether this expense was materialized by a transaction split
    pub fn is_split_entry(&self) -> bool {
        self.tags.iter().any(|t| t == SPLIT_TAG)
    }

    /// Link a bank transaction to this expense (idempotent append)
    pub fn link_bank_txn(&mut self, txn_id: BankTxnId) {
        if !self.linked_bank_txn_ids.contains(&txn_id) {
            self.linked_bank_txn_ids.push(txn_id);
        }
        self.from_bank_feed = true;
        self.touch();
    }

    /// Add a tag if not already present
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self.touch();
    }

    /// Bump the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate the record's invariants against the taxonomy
    pub fn validate(&self, taxonomy: &Taxonomy) -> Result<(), ExpenseValidationError> {
        if self.amount.is_negative() {
            return Err(ExpenseValidationError::NegativeAmount(self.amount));
        }

        if self.tax_amount.is_negative() || self.tax_amount > self.amount {
            return Err(ExpenseValidationError::TaxOutOfRange {
                tax: self.tax_amount,
                amount: self.amount,
            });
        }

        if !taxonomy.is_valid_sub_category(self.category, &self.sub_category) {
            return Err(ExpenseValidationError::UnknownSubCategory {
                category: self.category,
                sub_category: self.sub_category.clone(),
            });
        }

        if self.from_bank_feed && self.linked_bank_txn_ids.is_empty() {
            return Err(ExpenseValidationError::BankFlagWithoutLink);
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({}/{})",
            self.date.format("%Y-%m-%d"),
            self.vendor.as_deref().unwrap_or(&self.description),
            self.amount,
            self.category,
            self.sub_category
        )
    }
}

/// Validation errors for expense records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    NegativeAmount(Money),
    TaxOutOfRange { tax: Money, amount: Money },
    UnknownSubCategory {
        category: ExpenseCategory,
        sub_category: String,
    },
    BankFlagWithoutLink,
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeAmount(a) => write!(f, "expense amount {} cannot be negative", a),
            Self::TaxOutOfRange { tax, amount } => write!(
                f,
                "tax amount {} must be between ₹0.00 and the gross amount {}",
                tax, amount
            ),
            Self::UnknownSubCategory {
                category,
                sub_category,
            } => write!(
                f,
                "'{}' is not a sub-category of {}",
                sub_category, category
            ),
            Self::BankFlagWithoutLink => write!(
                f,
                "expense is marked as bank-originated but links no bank transaction"
            ),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}
