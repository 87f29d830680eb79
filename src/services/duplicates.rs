//! Duplicate expense detection
//!
//! Groups expenses that share a date, an exact amount, and a normalized
//! vendor (falling back to description), and supports merging a group down
//! to one surviving record. Dismissals are session-only: a dismissed group
//! reappears on the next scan if its members still exist.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::models::{Expense, ExpenseId, Money};

/// Grouping key for duplicate detection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    date: NaiveDate,
    amount: Money,
    party: String,
}

impl Signature {
    /// Build the signature of an expense. The vendor (or description when
    /// no vendor is set) is lowercased and whitespace-trimmed so that
    /// "HPCL Station" and " hpcl station " collide.
    pub fn of(expense: &Expense) -> Self {
        let party = expense
            .vendor
            .as_deref()
            .unwrap_or(&expense.description)
            .trim()
            .to_lowercase();
        Self {
            date: expense.date,
            amount: expense.amount,
            party,
        }
    }
}

/// A set of expenses sharing one signature, in ledger order
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub signature: Signature,
    pub expense_ids: Vec<ExpenseId>,
}

/// Scan session holding dismissed groups. Dismissals live only as long as
/// the session; they are never persisted.
#[derive(Debug, Default)]
pub struct DuplicateScan {
    dismissed: HashSet<Signature>,
}

impl DuplicateScan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find all duplicate groups, ordered by first appearance in the
    /// ledger. Groups of one are not duplicates; dismissed groups are
    /// filtered out.
    pub fn find_groups(&self, ledger: &Ledger) -> Vec<DuplicateGroup> {
        let mut by_signature: HashMap<Signature, Vec<ExpenseId>> = HashMap::new();
        let mut order: Vec<Signature> = Vec::new();

        for expense in &ledger.expenses {
            let sig = Signature::of(expense);
            let entry = by_signature.entry(sig.clone()).or_default();
            if entry.is_empty() {
                order.push(sig);
            }
            entry.push(expense.id);
        }

        order
            .into_iter()
            .filter(|sig| !self.dismissed.contains(sig))
            .filter_map(|sig| {
                let ids = by_signature.remove(&sig)?;
                (ids.len() > 1).then(|| DuplicateGroup {
                    signature: sig,
                    expense_ids: ids,
                })
            })
            .collect()
    }

    /// Hide a group for the rest of this session
    pub fn dismiss(&mut self, signature: Signature) {
        self.dismissed.insert(signature);
    }
}

/// Merge two duplicates: `keep` absorbs `drop_id`'s bank links and tags,
/// then `drop_id` is deleted. Returns the surviving expense.
pub fn merge(ledger: &mut Ledger, keep: ExpenseId, drop_id: ExpenseId) -> LedgerResult<Expense> {
    if keep == drop_id {
        return Err(LedgerError::Validation(
            "cannot merge an expense with itself".to_string(),
        ));
    }
    if ledger.expense(keep).is_none() {
        return Err(LedgerError::expense_not_found(keep.to_string()));
    }
    let dropped = ledger
        .remove_expense(drop_id)
        .ok_or_else(|| LedgerError::expense_not_found(drop_id.to_string()))?;

    let survivor = ledger
        .expense_mut(keep)
        .ok_or_else(|| LedgerError::expense_not_found(keep.to_string()))?;

    for txn_id in dropped.linked_bank_txn_ids {
        survivor.link_bank_txn(txn_id);
    }
    for tag in dropped.tags {
        survivor.add_tag(tag);
    }
    if survivor.invoice_number.is_none() {
        survivor.invoice_number = dropped.invoice_number;
    }
    survivor.has_invoice_copy |= dropped.has_invoice_copy;
    survivor.touch();

    Ok(survivor.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, VehicleId};

    fn expense(date: (i32, u32, u32), rupees: i64, vendor: &str) -> Expense {
        let mut e = Expense::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            Money::from_rupees(rupees),
            ExpenseCategory::Fuel,
            "Diesel",
            VehicleId::new(),
        );
        e.vendor = Some(vendor.to_string());
        e
    }

    #[test]
    fn test_scenario_duplicate_group() {
        // Spec scenario: two entries on 2024-05-15, ₹15000, "HPCL Station"
        let mut ledger = Ledger::new();
        let a = expense((2024, 5, 15), 15000, "HPCL Station");
        let b = expense((2024, 5, 15), 15000, "hpcl station ");
        let unrelated = expense((2024, 5, 15), 15000, "IOCL Pump");
        let (a_id, b_id) = (a.id, b.id);
        ledger.add_expense(a);
        ledger.add_expense(b);
        ledger.add_expense(unrelated);

        let scan = DuplicateScan::new();
        let groups = scan.find_groups(&ledger);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].expense_ids, vec![a_id, b_id]);
    }

    #[test]
    fn test_amount_and_date_must_match_exactly() {
        let mut ledger = Ledger::new();
        ledger.add_expense(expense((2024, 5, 15), 15000, "HPCL Station"));
        ledger.add_expense(expense((2024, 5, 16), 15000, "HPCL Station"));
        ledger.add_expense(expense((2024, 5, 15), 15001, "HPCL Station"));

        let scan = DuplicateScan::new();
        assert!(scan.find_groups(&ledger).is_empty());
    }

    #[test]
    fn test_description_fallback_when_no_vendor() {
        let mut ledger = Ledger::new();
        let mut a = expense((2024, 6, 1), 450, "");
        a.vendor = None;
        a.description = "Fastag topup".to_string();
        let mut b = expense((2024, 6, 1), 450, "");
        b.vendor = None;
        b.description = "FASTAG TOPUP".to_string();
        ledger.add_expense(a);
        ledger.add_expense(b);

        let scan = DuplicateScan::new();
        assert_eq!(scan.find_groups(&ledger).len(), 1);
    }

    #[test]
    fn test_groups_ordered_by_first_appearance() {
        let mut ledger = Ledger::new();
        ledger.add_expense(expense((2024, 7, 1), 100, "Alpha"));
        ledger.add_expense(expense((2024, 7, 2), 200, "Beta"));
        ledger.add_expense(expense((2024, 7, 2), 200, "Beta"));
        ledger.add_expense(expense((2024, 7, 1), 100, "Alpha"));

        let scan = DuplicateScan::new();
        let groups = scan.find_groups(&ledger);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].signature.party, "alpha");
        assert_eq!(groups[1].signature.party, "beta");
    }

    #[test]
    fn test_dismiss_is_session_only() {
        let mut ledger = Ledger::new();
        ledger.add_expense(expense((2024, 5, 15), 15000, "HPCL Station"));
        ledger.add_expense(expense((2024, 5, 15), 15000, "HPCL Station"));

        let mut scan = DuplicateScan::new();
        let groups = scan.find_groups(&ledger);
        scan.dismiss(groups[0].signature.clone());
        assert!(scan.find_groups(&ledger).is_empty());

        // A fresh session sees the group again
        let fresh = DuplicateScan::new();
        assert_eq!(fresh.find_groups(&ledger).len(), 1);
    }

    #[test]
    fn test_merge_absorbs_links_and_deletes() {
        let mut ledger = Ledger::new();
        let keep = expense((2024, 5, 15), 15000, "HPCL Station");
        let mut drop_it = expense((2024, 5, 15), 15000, "HPCL Station");
        let txn_id = crate::models::BankTxnId::new();
        drop_it.link_bank_txn(txn_id);
        drop_it.invoice_number = Some("INV-442".to_string());
        let (keep_id, drop_id) = (keep.id, drop_it.id);
        ledger.add_expense(keep);
        ledger.add_expense(drop_it);

        let survivor = merge(&mut ledger, keep_id, drop_id).unwrap();
        assert_eq!(survivor.id, keep_id);
        assert!(survivor.linked_bank_txn_ids.contains(&txn_id));
        assert_eq!(survivor.invoice_number.as_deref(), Some("INV-442"));
        assert!(ledger.expense(drop_id).is_none());
        assert_eq!(ledger.expenses.len(), 1);
    }

    #[test]
    fn test_merge_rejects_self_and_missing() {
        let mut ledger = Ledger::new();
        let e = expense((2024, 5, 15), 100, "X");
        let id = e.id;
        ledger.add_expense(e);

        assert!(matches!(
            merge(&mut ledger, id, id),
            Err(LedgerError::Validation(_))
        ));
        assert!(merge(&mut ledger, id, ExpenseId::new())
            .unwrap_err()
            .is_not_found());
        assert!(merge(&mut ledger, ExpenseId::new(), id)
            .unwrap_err()
            .is_not_found());
        // Failed merges delete nothing
        assert_eq!(ledger.expenses.len(), 1);
    }
}
