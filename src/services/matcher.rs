//! Bank transaction matcher
//!
//! Proposes correspondences between pending bank transactions and manually
//! entered expenses, and drives the quick-create path that turns a feed line
//! directly into an expense. Matching is exact-amount only; date and vendor
//! similarity scoring is a future extension, not implemented here.

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::models::{
    BankTransaction, BankTxnId, BankTxnStatus, Expense, ExpenseCategory, ExpenseId, PaymentMethod,
    Taxonomy, VehicleId,
};
use crate::tax;

/// Result of linking a bank transaction to an expense
#[derive(Debug, Clone)]
pub struct LinkOutcome {
    /// The expense after gaining the link
    pub expense: Expense,
    /// The transaction after moving to `Linked`
    pub txn: BankTransaction,
}

/// Per-item results of a bulk operation. Items succeed or fail
/// independently; there is no group rollback.
#[derive(Debug)]
pub struct BulkOutcome {
    /// Transactions that transitioned successfully
    pub succeeded: Vec<BankTxnId>,
    /// Transactions that failed, with the reason
    pub failed: Vec<(BankTxnId, LedgerError)>,
}

impl BulkOutcome {
    fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Whether every item in the batch succeeded
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Find manual expenses whose amount matches a bank transaction exactly.
///
/// "Exactly" means to the paisa; amounts are stored in sub-units so no
/// floating tolerance is needed. Input order is preserved.
pub fn find_candidates(ledger: &Ledger, txn_id: BankTxnId) -> LedgerResult<Vec<&Expense>> {
    let txn = ledger
        .bank_txn(txn_id)
        .ok_or_else(|| LedgerError::bank_txn_not_found(txn_id.to_string()))?;

    Ok(ledger
        .manual_expenses()
        .filter(|e| (e.amount - txn.amount).abs().paise() < 1)
        .collect())
}

/// Link an existing manual expense to a pending bank transaction.
///
/// The expense gains the transaction id in `linked_bank_txn_ids` and is
/// flagged as bank-originated; the transaction moves `Pending -> Linked`.
pub fn link_existing(
    ledger: &mut Ledger,
    txn_id: BankTxnId,
    expense_id: ExpenseId,
) -> LedgerResult<LinkOutcome> {
    // Validate both ends before mutating anything
    if ledger.expense(expense_id).is_none() {
        return Err(LedgerError::expense_not_found(expense_id.to_string()));
    }
    let txn = ledger
        .bank_txn_mut(txn_id)
        .ok_or_else(|| LedgerError::bank_txn_not_found(txn_id.to_string()))?;

    txn.transition(BankTxnStatus::Linked)?;
    let txn = txn.clone();

    let expense = ledger
        .expense_mut(expense_id)
        .ok_or_else(|| LedgerError::expense_not_found(expense_id.to_string()))?;
    expense.link_bank_txn(txn_id);
    let expense = expense.clone();

    Ok(LinkOutcome { expense, txn })
}

/// Materialize a new expense directly from a pending bank transaction.
///
/// Amount, date, and vendor/description are seeded from the feed line; the
/// GST rate and amount come from the taxonomy suggestion for the chosen
/// category. The transaction moves to `Linked`.
pub fn quick_create(
    ledger: &mut Ledger,
    taxonomy: &Taxonomy,
    txn_id: BankTxnId,
    category: ExpenseCategory,
    sub_category: Option<&str>,
    vehicle_id: VehicleId,
) -> LedgerResult<Expense> {
    let txn = ledger
        .bank_txn(txn_id)
        .ok_or_else(|| LedgerError::bank_txn_not_found(txn_id.to_string()))?
        .clone();

    let sub_category = sub_category
        .map(str::to_string)
        .unwrap_or_else(|| taxonomy.default_sub_category(category).to_string());
    let rate = tax::suggest_rate(taxonomy, category, &sub_category);

    let mut expense = Expense::new(txn.date, txn.amount, category, sub_category, vehicle_id);
    expense.description = txn.description.clone();
    expense.vendor = Some(txn.description.clone());
    expense.tax_rate = rate;
    expense.tax_amount = tax::tax_from_gross(txn.amount, rate);
    expense.payment_method = PaymentMethod::BankTransfer;
    expense.link_bank_txn(txn_id);

    // Validate before the transition so a failure leaves nothing changed
    expense
        .validate(taxonomy)
        .map_err(|e| LedgerError::Validation(e.to_string()))?;

    ledger
        .bank_txn_mut(txn_id)
        .ok_or_else(|| LedgerError::bank_txn_not_found(txn_id.to_string()))?
        .transition(BankTxnStatus::Linked)?;

    ledger.add_expense(expense.clone());
    Ok(expense)
}

/// Mark a pending bank transaction as personal/non-business.
///
/// A `Linked` transaction cannot be excluded; it would have to be unlinked
/// first, and no unlink transition exists.
pub fn exclude(ledger: &mut Ledger, txn_id: BankTxnId) -> LedgerResult<BankTransaction> {
    let txn = ledger
        .bank_txn_mut(txn_id)
        .ok_or_else(|| LedgerError::bank_txn_not_found(txn_id.to_string()))?;

    txn.transition(BankTxnStatus::Excluded)?;
    Ok(txn.clone())
}

/// Exclude a set of transactions, one independent transition per item.
pub fn bulk_exclude(ledger: &mut Ledger, txn_ids: &[BankTxnId]) -> BulkOutcome {
    let mut outcome = BulkOutcome::new();
    for &id in txn_ids {
        match exclude(ledger, id) {
            Ok(_) => outcome.succeeded.push(id),
            Err(e) => outcome.failed.push((id, e)),
        }
    }
    outcome
}

/// Quick-create expenses for a set of transactions, one independent
/// operation per item.
pub fn bulk_quick_create(
    ledger: &mut Ledger,
    taxonomy: &Taxonomy,
    txn_ids: &[BankTxnId],
    category: ExpenseCategory,
    vehicle_id: VehicleId,
) -> BulkOutcome {
    let mut outcome = BulkOutcome::new();
    for &id in txn_ids {
        match quick_create(ledger, taxonomy, id, category, None, vehicle_id) {
            Ok(_) => outcome.succeeded.push(id),
            Err(e) => outcome.failed.push((id, e)),
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconciliationError;
    use crate::models::Money;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    fn manual_expense(rupees: i64) -> Expense {
        Expense::new(
            date(),
            Money::from_rupees(rupees),
            ExpenseCategory::Maintenance,
            "Brake Service",
            VehicleId::new(),
        )
    }

    fn pending_txn(rupees: i64, description: &str) -> BankTransaction {
        BankTransaction::new(date(), Money::from_rupees(rupees), description)
    }

    #[test]
    fn test_find_candidates_exact_amount_only() {
        let mut ledger = Ledger::new();
        let matching = manual_expense(8000);
        let matching_id = matching.id;
        ledger.add_expense(matching);
        ledger.add_expense(manual_expense(7999));
        ledger.add_expense(manual_expense(8001));

        // Bank-originated expenses are never candidates, even on amount match
        let mut already_linked = manual_expense(8000);
        already_linked.link_bank_txn(BankTxnId::new());
        ledger.add_expense(already_linked);

        let txn = pending_txn(8000, "NEFT: LOCAL MECH");
        let txn_id = txn.id;
        ledger.add_bank_txn(txn);

        let candidates = find_candidates(&ledger, txn_id).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, matching_id);
    }

    #[test]
    fn test_find_candidates_preserves_input_order() {
        let mut ledger = Ledger::new();
        let first = manual_expense(450);
        let second = manual_expense(450);
        let (first_id, second_id) = (first.id, second.id);
        ledger.add_expense(first);
        ledger.add_expense(second);

        let txn = pending_txn(450, "FASTAG RECHARGE - ICICI");
        let txn_id = txn.id;
        ledger.add_bank_txn(txn);

        let ids: Vec<_> = find_candidates(&ledger, txn_id)
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![first_id, second_id]);
    }

    #[test]
    fn test_link_existing_scenario() {
        // Spec scenario: pending ₹8000 txn + manual ₹8000 expense
        let mut ledger = Ledger::new();
        let expense = manual_expense(8000);
        let expense_id = expense.id;
        ledger.add_expense(expense);

        let txn = pending_txn(8000, "NEFT: LOCAL MECH");
        let txn_id = txn.id;
        ledger.add_bank_txn(txn);

        let candidates = find_candidates(&ledger, txn_id).unwrap();
        assert_eq!(candidates.len(), 1);

        let outcome = link_existing(&mut ledger, txn_id, expense_id).unwrap();
        assert_eq!(outcome.txn.status, BankTxnStatus::Linked);
        assert!(outcome.expense.from_bank_feed);
        assert!(outcome.expense.linked_bank_txn_ids.contains(&txn_id));

        // Mutations landed in the ledger too
        assert_eq!(
            ledger.bank_txn(txn_id).unwrap().status,
            BankTxnStatus::Linked
        );
        assert!(ledger.linked_txns_balanced());
    }

    #[test]
    fn test_link_existing_rejects_non_pending() {
        let mut ledger = Ledger::new();
        let expense = manual_expense(8000);
        let expense_id = expense.id;
        ledger.add_expense(expense);

        let mut txn = pending_txn(8000, "NEFT");
        txn.transition(BankTxnStatus::Linked).unwrap();
        let txn_id = txn.id;
        ledger.add_bank_txn(txn);

        let err = link_existing(&mut ledger, txn_id, expense_id).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Reconciliation(ReconciliationError::InvalidTransition { .. })
        ));
        // Expense left untouched
        assert!(!ledger.expense(expense_id).unwrap().from_bank_feed);
    }

    #[test]
    fn test_link_existing_missing_expense() {
        let mut ledger = Ledger::new();
        let txn = pending_txn(100, "X");
        let txn_id = txn.id;
        ledger.add_bank_txn(txn);

        let err = link_existing(&mut ledger, txn_id, ExpenseId::new()).unwrap_err();
        assert!(err.is_not_found());
        // Transaction not consumed by the failed attempt
        assert!(ledger.bank_txn(txn_id).unwrap().is_pending());
    }

    #[test]
    fn test_quick_create_seeds_from_txn() {
        let mut ledger = Ledger::new();
        let taxonomy = Taxonomy::standard();
        let txn = pending_txn(5000, "HPCL FUEL STRIPES");
        let txn_id = txn.id;
        ledger.add_bank_txn(txn);

        let vehicle = VehicleId::new();
        let expense = quick_create(
            &mut ledger,
            &taxonomy,
            txn_id,
            ExpenseCategory::Fuel,
            None,
            vehicle,
        )
        .unwrap();

        assert_eq!(expense.amount, Money::from_rupees(5000));
        assert_eq!(expense.vendor.as_deref(), Some("HPCL FUEL STRIPES"));
        assert_eq!(expense.sub_category, "Diesel");
        // Fuel/Diesel suggests 0%: no creditable GST on plain diesel
        assert_eq!(expense.tax_rate, 0);
        assert_eq!(expense.tax_amount, Money::zero());
        assert!(expense.from_bank_feed);
        assert_eq!(expense.linked_bank_txn_ids, vec![txn_id]);
        assert_eq!(
            ledger.bank_txn(txn_id).unwrap().status,
            BankTxnStatus::Linked
        );
        assert!(ledger.linked_txns_balanced());
    }

    #[test]
    fn test_quick_create_with_taxed_sub_category() {
        let mut ledger = Ledger::new();
        let taxonomy = Taxonomy::standard();
        let txn = pending_txn(11800, "TYRE HOUSE");
        let txn_id = txn.id;
        ledger.add_bank_txn(txn);

        let expense = quick_create(
            &mut ledger,
            &taxonomy,
            txn_id,
            ExpenseCategory::Maintenance,
            Some("Tire Replacement"),
            VehicleId::new(),
        )
        .unwrap();

        assert_eq!(expense.tax_rate, 28);
        assert_eq!(
            expense.tax_amount,
            crate::tax::tax_from_gross(Money::from_rupees(11800), 28)
        );
    }

    #[test]
    fn test_quick_create_failure_leaves_ledger_untouched() {
        let mut ledger = Ledger::new();
        let taxonomy = Taxonomy::standard();
        let txn = pending_txn(5000, "HPCL FUEL STRIPES");
        let txn_id = txn.id;
        ledger.add_bank_txn(txn);

        // "Windshield" is not a Fuel sub-category
        let err = quick_create(
            &mut ledger,
            &taxonomy,
            txn_id,
            ExpenseCategory::Fuel,
            Some("Windshield"),
            VehicleId::new(),
        )
        .unwrap_err();

        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(ledger.bank_txn(txn_id).unwrap().is_pending());
        assert!(ledger.expenses.is_empty());
        assert!(ledger.linked_txns_balanced());
    }

    #[test]
    fn test_exclude_legal_and_illegal() {
        let mut ledger = Ledger::new();
        let txn = pending_txn(450, "PERSONAL SPEND");
        let txn_id = txn.id;
        ledger.add_bank_txn(txn);

        let excluded = exclude(&mut ledger, txn_id).unwrap();
        assert_eq!(excluded.status, BankTxnStatus::Excluded);

        // Excluding again is an invalid transition, state unchanged
        let err = exclude(&mut ledger, txn_id).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Reconciliation(ReconciliationError::InvalidTransition {
                from: BankTxnStatus::Excluded,
                ..
            })
        ));
        assert_eq!(
            ledger.bank_txn(txn_id).unwrap().status,
            BankTxnStatus::Excluded
        );
    }

    #[test]
    fn test_bulk_exclude_partial_success() {
        let mut ledger = Ledger::new();
        let a = pending_txn(100, "A");
        let mut b = pending_txn(200, "B");
        b.transition(BankTxnStatus::Linked).unwrap();
        let (a_id, b_id) = (a.id, b.id);
        ledger.add_bank_txn(a);
        ledger.add_bank_txn(b);

        let outcome = bulk_exclude(&mut ledger, &[a_id, b_id]);
        assert_eq!(outcome.succeeded, vec![a_id]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, b_id);
        assert!(!outcome.all_succeeded());

        // The failure did not roll back the success
        assert_eq!(
            ledger.bank_txn(a_id).unwrap().status,
            BankTxnStatus::Excluded
        );
    }

    #[test]
    fn test_bulk_quick_create() {
        let mut ledger = Ledger::new();
        let taxonomy = Taxonomy::standard();
        let a = pending_txn(1000, "FUEL A");
        let b = pending_txn(2000, "FUEL B");
        let ids = vec![a.id, b.id];
        ledger.add_bank_txn(a);
        ledger.add_bank_txn(b);

        let outcome = bulk_quick_create(
            &mut ledger,
            &taxonomy,
            &ids,
            ExpenseCategory::Fuel,
            VehicleId::new(),
        );
        assert!(outcome.all_succeeded());
        assert_eq!(ledger.expenses.len(), 2);
        assert!(ledger.linked_txns_balanced());
    }
}
