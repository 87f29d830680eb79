//! Bank transaction model
//!
//! One debit line from an imported bank statement, with an explicit status
//! state machine. Every status change goes through the central transition
//! table so illegal moves surface as typed errors instead of silent no-ops.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ReconciliationError;

use super::ids::{BankTxnId, ExpenseId};
use super::money::Money;

/// Reconciliation status of a bank transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BankTxnStatus {
    /// Imported but not yet accounted for
    #[default]
    Pending,
    /// Fully accounted for by one or more linked expenses
    Linked,
    /// Marked personal/non-business; out of the reconciliation scope
    Excluded,
}

impl BankTxnStatus {
    /// The transition table. Normal flow is one-directional: a transaction
    /// leaves `Pending` exactly once and never comes back (undo is a product
    /// decision that does not exist yet).
    pub fn can_transition(self, to: BankTxnStatus) -> bool {
        matches!(
            (self, to),
            (BankTxnStatus::Pending, BankTxnStatus::Linked)
                | (BankTxnStatus::Pending, BankTxnStatus::Excluded)
        )
    }

    /// Whether the transaction still awaits reconciliation
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for BankTxnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Linked => write!(f, "Linked"),
            Self::Excluded => write!(f, "Excluded"),
        }
    }
}

/// A single bank feed debit line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    /// Unique identifier
    pub id: BankTxnId,

    /// Value date of the debit
    pub date: NaiveDate,

    /// Debit amount; always positive
    pub amount: Money,

    /// Raw statement narration text
    pub description: String,

    /// Reconciliation status
    #[serde(default)]
    pub status: BankTxnStatus,

    /// A suspected matching expense, when the feed import spotted one
    pub potential_match: Option<ExpenseId>,

    /// Feed dedup key derived from (date, amount, description); set for
    /// imported lines so re-importing the same statement skips them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_id: Option<String>,

    /// When this line was imported
    pub created_at: DateTime<Utc>,
}

impl BankTransaction {
    /// Create a new pending bank transaction
    pub fn new(date: NaiveDate, amount: Money, description: impl Into<String>) -> Self {
        Self {
            id: BankTxnId::new(),
            date,
            amount,
            description: description.into(),
            status: BankTxnStatus::Pending,
            potential_match: None,
            import_id: None,
            created_at: Utc::now(),
        }
    }

    /// Move to a new status, enforcing the transition table
    pub fn transition(&mut self, to: BankTxnStatus) -> Result<(), ReconciliationError> {
        if !self.status.can_transition(to) {
            return Err(ReconciliationError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Whether this transaction can still be linked, split, or excluded
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }
}

impl fmt::Display for BankTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} [{}]",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount,
            self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_txn() -> BankTransaction {
        BankTransaction::new(
            NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            Money::from_rupees(5000),
            "HPCL FUEL STRIPES",
        )
    }

    #[test]
    fn test_new_is_pending() {
        let txn = sample_txn();
        assert_eq!(txn.status, BankTxnStatus::Pending);
        assert!(txn.is_pending());
    }

    #[test]
    fn test_legal_transitions() {
        let mut txn = sample_txn();
        assert!(txn.transition(BankTxnStatus::Linked).is_ok());
        assert_eq!(txn.status, BankTxnStatus::Linked);

        let mut txn = sample_txn();
        assert!(txn.transition(BankTxnStatus::Excluded).is_ok());
        assert_eq!(txn.status, BankTxnStatus::Excluded);
    }

    #[test]
    fn test_illegal_transitions_leave_state_unchanged() {
        let mut txn = sample_txn();
        txn.transition(BankTxnStatus::Linked).unwrap();

        let err = txn.transition(BankTxnStatus::Excluded).unwrap_err();
        assert_eq!(
            err,
            ReconciliationError::InvalidTransition {
                from: BankTxnStatus::Linked,
                to: BankTxnStatus::Excluded,
            }
        );
        assert_eq!(txn.status, BankTxnStatus::Linked);

        // No route back to Pending either
        let err = txn.transition(BankTxnStatus::Pending).unwrap_err();
        assert!(matches!(err, ReconciliationError::InvalidTransition { .. }));
        assert_eq!(txn.status, BankTxnStatus::Linked);
    }

    #[test]
    fn test_excluded_is_terminal() {
        let mut txn = sample_txn();
        txn.transition(BankTxnStatus::Excluded).unwrap();
        assert!(txn.transition(BankTxnStatus::Linked).is_err());
        assert!(txn.transition(BankTxnStatus::Pending).is_err());
        assert_eq!(txn.status, BankTxnStatus::Excluded);
    }

    #[test]
    fn test_self_transition_is_illegal() {
        let mut txn = sample_txn();
        assert!(txn.transition(BankTxnStatus::Pending).is_err());
    }

    #[test]
    fn test_serialization() {
        let txn = sample_txn();
        let json = serde_json::to_string(&txn).unwrap();
        let deserialized: BankTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(txn.id, deserialized.id);
        assert_eq!(txn.amount, deserialized.amount);
        assert_eq!(txn.status, deserialized.status);
    }
}
