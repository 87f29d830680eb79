//! In-memory ledger state
//!
//! The authoritative snapshot the reconciliation core reads and mutates:
//! the expense collection and the bank transaction collection. The shell
//! loads it from storage, hands it to exactly one operation at a time, and
//! persists the result; the core itself performs no I/O. Insertion order is
//! preserved because duplicate grouping and candidate matching are specified
//! as stable over input order.

use serde::{Deserialize, Serialize};

use crate::models::{BankTransaction, BankTxnId, BankTxnStatus, Expense, ExpenseId};

/// The in-memory expense ledger and bank feed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// All expense records, in insertion order
    pub expenses: Vec<Expense>,
    /// All imported bank transactions, in insertion order
    pub bank_txns: Vec<BankTransaction>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an expense by id
    pub fn expense(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    /// Look up an expense mutably by id
    pub fn expense_mut(&mut self, id: ExpenseId) -> Option<&mut Expense> {
        self.expenses.iter_mut().find(|e| e.id == id)
    }

    /// Look up a bank transaction by id
    pub fn bank_txn(&self, id: BankTxnId) -> Option<&BankTransaction> {
        self.bank_txns.iter().find(|t| t.id == id)
    }

    /// Look up a bank transaction mutably by id
    pub fn bank_txn_mut(&mut self, id: BankTxnId) -> Option<&mut BankTransaction> {
        self.bank_txns.iter_mut().find(|t| t.id == id)
    }

    /// Append a new expense record
    pub fn add_expense(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    /// Remove an expense by id, returning it if present
    pub fn remove_expense(&mut self, id: ExpenseId) -> Option<Expense> {
        let idx = self.expenses.iter().position(|e| e.id == id)?;
        Some(self.expenses.remove(idx))
    }

    /// Append a new bank transaction
    pub fn add_bank_txn(&mut self, txn: BankTransaction) {
        self.bank_txns.push(txn);
    }

    /// Manual expenses: those not originated from the bank feed
    pub fn manual_expenses(&self) -> impl Iterator<Item = &Expense> {
        self.expenses.iter().filter(|e| !e.from_bank_feed)
    }

    /// Pending bank transactions awaiting reconciliation
    pub fn pending_bank_txns(&self) -> impl Iterator<Item = &BankTransaction> {
        self.bank_txns.iter().filter(|t| t.is_pending())
    }

    /// Expenses accounting for a given bank transaction
    pub fn expenses_linked_to(&self, txn_id: BankTxnId) -> Vec<&Expense> {
        self.expenses
            .iter()
            .filter(|e| e.linked_bank_txn_ids.contains(&txn_id))
            .collect()
    }

    /// Consistency check: every `Linked` transaction must be fully accounted
    /// for by the expenses referencing it, to the paisa.
    pub fn linked_txns_balanced(&self) -> bool {
        self.bank_txns
            .iter()
            .filter(|t| t.status == BankTxnStatus::Linked)
            .all(|t| {
                let covered: crate::models::Money = self
                    .expenses_linked_to(t.id)
                    .iter()
                    .map(|e| e.amount)
                    .sum();
                (covered - t.amount).abs().paise() <= 1
            })
    }
}
