//! Transaction splitting
//!
//! A `SplitSession` carves one pending bank transaction into multiple expense
//! lines that must account for the full amount before they can be committed.
//! Commit is all-or-nothing: either every line becomes an expense and the
//! transaction moves to `Linked`, or nothing changes.

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult, ReconciliationError};
use crate::ledger::Ledger;
use crate::models::{
    BankTxnId, BankTxnStatus, Expense, ExpenseCategory, Money, PaymentMethod, Taxonomy, VehicleId,
    SPLIT_TAG,
};
use crate::tax;

/// Lifecycle of a split session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitState {
    /// Lines may be added, removed, and edited
    Editing,
    /// Lines have been materialized as expenses; the session is closed
    Committed,
    /// The session was discarded without touching the ledger
    Aborted,
}

/// One prospective expense within a split
#[derive(Debug, Clone)]
pub struct SplitLine {
    pub amount: Money,
    pub category: ExpenseCategory,
    pub sub_category: String,
    pub description: String,
    pub vehicle_id: VehicleId,
    pub tax_rate: u8,
    pub tax_amount: Money,
    /// Set once the operator edits the tax by hand; suppresses recomputation
    tax_overridden: bool,
}

impl SplitLine {
    fn new(
        taxonomy: &Taxonomy,
        amount: Money,
        category: ExpenseCategory,
        vehicle_id: VehicleId,
    ) -> Self {
        let sub_category = taxonomy.default_sub_category(category).to_string();
        let tax_rate = tax::suggest_rate(taxonomy, category, &sub_category);
        Self {
            amount,
            category,
            sub_category,
            description: String::new(),
            vehicle_id,
            tax_rate,
            tax_amount: tax::tax_from_gross(amount, tax_rate),
            tax_overridden: false,
        }
    }

    fn recompute_tax(&mut self, taxonomy: &Taxonomy) {
        if !self.tax_overridden {
            self.tax_rate = tax::suggest_rate(taxonomy, self.category, &self.sub_category);
            self.tax_amount = tax::tax_from_gross(self.amount, self.tax_rate);
        }
    }
}

/// A partial edit applied to one split line. `None` fields are left as-is.
#[derive(Debug, Default, Clone)]
pub struct LineUpdate {
    pub amount: Option<Money>,
    pub category: Option<ExpenseCategory>,
    pub sub_category: Option<String>,
    pub description: Option<String>,
    pub vehicle_id: Option<VehicleId>,
    /// Manual tax override; disables automatic recomputation for this line
    pub tax_amount: Option<Money>,
}

/// An in-progress split of one bank transaction
#[derive(Debug)]
pub struct SplitSession {
    txn_id: BankTxnId,
    txn_date: NaiveDate,
    txn_amount: Money,
    txn_description: String,
    default_vehicle: VehicleId,
    lines: Vec<SplitLine>,
    state: SplitState,
}

impl SplitSession {
    /// Open a split session for a pending bank transaction.
    ///
    /// The session starts with a single line covering the full amount,
    /// categorized Fuel/Diesel with the taxonomy-suggested rate. New lines
    /// default to `default_vehicle`; each line may be reassigned.
    pub fn new(
        ledger: &Ledger,
        taxonomy: &Taxonomy,
        txn_id: BankTxnId,
        default_vehicle: VehicleId,
    ) -> LedgerResult<Self> {
        let txn = ledger
            .bank_txn(txn_id)
            .ok_or_else(|| LedgerError::bank_txn_not_found(txn_id.to_string()))?;

        if !txn.is_pending() {
            return Err(ReconciliationError::InvalidTransition {
                from: txn.status,
                to: BankTxnStatus::Linked,
            }
            .into());
        }

        let lines = vec![SplitLine::new(
            taxonomy,
            txn.amount,
            ExpenseCategory::Fuel,
            default_vehicle,
        )];
        Ok(Self {
            txn_id,
            txn_date: txn.date,
            txn_amount: txn.amount,
            txn_description: txn.description.clone(),
            default_vehicle,
            lines,
            state: SplitState::Editing,
        })
    }

    pub fn state(&self) -> SplitState {
        self.state
    }

    pub fn lines(&self) -> &[SplitLine] {
        &self.lines
    }

    /// Sum of all line amounts
    pub fn allocated(&self) -> Money {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// Transaction amount not yet covered by a line. Negative when the
    /// lines over-allocate.
    pub fn remainder(&self) -> Money {
        self.txn_amount - self.allocated()
    }

    /// Whether the lines cover the transaction to within one paisa
    pub fn is_balanced(&self) -> bool {
        self.remainder().abs().paise() <= 1
    }

    fn ensure_editing(&self) -> LedgerResult<()> {
        match self.state {
            SplitState::Editing => Ok(()),
            _ => Err(LedgerError::Validation(format!(
                "split session is already {:?}",
                self.state
            ))),
        }
    }

    /// Add a new line seeded with the current remainder, Other/Misc.
    ///
    /// Refused when nothing remains to allocate; shrink an existing line
    /// first.
    pub fn add_line(&mut self, taxonomy: &Taxonomy) -> LedgerResult<usize> {
        self.ensure_editing()?;
        let remainder = self.remainder();
        if !remainder.is_positive() {
            return Err(LedgerError::Validation(format!(
                "nothing left to allocate: remainder is {}",
                remainder
            )));
        }
        self.lines.push(SplitLine::new(
            taxonomy,
            remainder,
            ExpenseCategory::Other,
            self.default_vehicle,
        ));
        Ok(self.lines.len() - 1)
    }

    /// Remove a line. The last remaining line cannot be removed.
    pub fn remove_line(&mut self, index: usize) -> LedgerResult<SplitLine> {
        self.ensure_editing()?;
        if index >= self.lines.len() {
            return Err(LedgerError::Validation(format!(
                "no split line at index {}",
                index
            )));
        }
        if self.lines.len() == 1 {
            return Err(ReconciliationError::EmptySplit.into());
        }
        Ok(self.lines.remove(index))
    }

    /// Apply a partial edit to one line, recomputing tax from the taxonomy
    /// unless the update (or an earlier one) set the tax by hand.
    pub fn update_line(
        &mut self,
        taxonomy: &Taxonomy,
        index: usize,
        update: LineUpdate,
    ) -> LedgerResult<()> {
        self.ensure_editing()?;
        let line = self.lines.get_mut(index).ok_or_else(|| {
            LedgerError::Validation(format!("no split line at index {}", index))
        })?;

        // Edit a working copy so a rejected update leaves the line untouched
        let mut edited = line.clone();

        if let Some(amount) = update.amount {
            if amount.is_negative() {
                return Err(LedgerError::Validation(format!(
                    "split line amount {} cannot be negative",
                    amount
                )));
            }
            edited.amount = amount;
        }
        if let Some(category) = update.category {
            edited.category = category;
            // Old sub-category rarely belongs to the new category
            if update.sub_category.is_none() {
                edited.sub_category = taxonomy.default_sub_category(category).to_string();
            }
        }
        if let Some(sub_category) = update.sub_category {
            if !taxonomy.is_valid_sub_category(edited.category, &sub_category) {
                return Err(LedgerError::Validation(format!(
                    "'{}' is not a sub-category of {}",
                    sub_category, edited.category
                )));
            }
            edited.sub_category = sub_category;
        }
        if let Some(description) = update.description {
            edited.description = description;
        }
        if let Some(vehicle_id) = update.vehicle_id {
            edited.vehicle_id = vehicle_id;
        }
        if let Some(tax_amount) = update.tax_amount {
            edited.tax_overridden = true;
            edited.tax_amount = tax_amount;
        }

        edited.recompute_tax(taxonomy);
        if edited.tax_amount.is_negative() || edited.tax_amount > edited.amount {
            return Err(LedgerError::Validation(format!(
                "tax {} must lie between zero and the line amount {}",
                edited.tax_amount, edited.amount
            )));
        }

        *line = edited;
        Ok(())
    }

    /// Drop a line's manual tax override and return to suggested tax
    pub fn reset_tax(&mut self, taxonomy: &Taxonomy, index: usize) -> LedgerResult<()> {
        self.ensure_editing()?;
        let line = self.lines.get_mut(index).ok_or_else(|| {
            LedgerError::Validation(format!("no split line at index {}", index))
        })?;
        line.tax_overridden = false;
        line.recompute_tax(taxonomy);
        Ok(())
    }

    /// Materialize every line as an expense and link the transaction.
    ///
    /// Fails without modifying the ledger when the lines do not balance,
    /// any line fails validation, or the transaction is no longer pending.
    pub fn commit(&mut self, ledger: &mut Ledger) -> LedgerResult<Vec<Expense>> {
        self.ensure_editing()?;

        if self.lines.is_empty() {
            return Err(ReconciliationError::EmptySplit.into());
        }
        if !self.is_balanced() {
            return Err(ReconciliationError::Imbalance {
                remainder: self.remainder(),
            }
            .into());
        }

        let build_expense = |line: &SplitLine| -> LedgerResult<Expense> {
            if line.tax_amount.is_negative() || line.tax_amount > line.amount {
                return Err(LedgerError::Validation(format!(
                    "tax {} must lie between zero and the line amount {}",
                    line.tax_amount, line.amount
                )));
            }
            let mut expense = Expense::new(
                self.txn_date,
                line.amount,
                line.category,
                line.sub_category.clone(),
                line.vehicle_id,
            );
            expense.description = if line.description.is_empty() {
                self.txn_description.clone()
            } else {
                line.description.clone()
            };
            expense.vendor = Some(self.txn_description.clone());
            expense.tax_rate = line.tax_rate;
            expense.tax_amount = line.tax_amount;
            expense.payment_method = PaymentMethod::BankTransfer;
            expense.link_bank_txn(self.txn_id);
            expense.add_tag(SPLIT_TAG);
            Ok(expense)
        };

        // Build everything before touching the ledger so a late failure
        // leaves no partial state
        let expenses: Vec<Expense> = self
            .lines
            .iter()
            .map(build_expense)
            .collect::<LedgerResult<_>>()?;

        let txn = ledger
            .bank_txn_mut(self.txn_id)
            .ok_or_else(|| LedgerError::bank_txn_not_found(self.txn_id.to_string()))?;
        txn.transition(BankTxnStatus::Linked)?;

        for expense in &expenses {
            ledger.add_expense(expense.clone());
        }

        self.state = SplitState::Committed;
        Ok(expenses)
    }

    /// Discard the session without touching the ledger
    pub fn abort(&mut self) {
        if self.state == SplitState::Editing {
            self.state = SplitState::Aborted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BankTransaction;

    fn setup(rupees: i64) -> (Ledger, Taxonomy, BankTxnId, VehicleId) {
        let mut ledger = Ledger::new();
        let txn = BankTransaction::new(
            NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            Money::from_rupees(rupees),
            "IOCL PETROL PUMP",
        );
        let txn_id = txn.id;
        ledger.add_bank_txn(txn);
        (ledger, Taxonomy::standard(), txn_id, VehicleId::new())
    }

    #[test]
    fn test_new_session_single_full_line() {
        let (ledger, taxonomy, txn_id, vehicle) = setup(5000);
        let session = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap();

        assert_eq!(session.state(), SplitState::Editing);
        assert_eq!(session.lines().len(), 1);
        let line = &session.lines()[0];
        assert_eq!(line.amount, Money::from_rupees(5000));
        assert_eq!(line.category, ExpenseCategory::Fuel);
        assert_eq!(line.sub_category, "Diesel");
        // Diesel carries no creditable GST
        assert_eq!(line.tax_rate, 0);
        assert!(session.remainder().is_zero());
    }

    #[test]
    fn test_new_session_rejects_non_pending() {
        let (mut ledger, taxonomy, txn_id, vehicle) = setup(5000);
        ledger
            .bank_txn_mut(txn_id)
            .unwrap()
            .transition(BankTxnStatus::Excluded)
            .unwrap();

        let err = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap_err();
        assert!(err.is_reconciliation());
    }

    #[test]
    fn test_split_commit_scenario() {
        // Spec scenario: ₹5000 carved into ₹3000 fuel + ₹2000 maintenance
        let (mut ledger, taxonomy, txn_id, vehicle) = setup(5000);
        let mut session = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap();

        session
            .update_line(
                &taxonomy,
                0,
                LineUpdate {
                    amount: Some(Money::from_rupees(3000)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(session.remainder(), Money::from_rupees(2000));

        let idx = session.add_line(&taxonomy).unwrap();
        session
            .update_line(
                &taxonomy,
                idx,
                LineUpdate {
                    category: Some(ExpenseCategory::Maintenance),
                    sub_category: Some("Oil Change".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(session.is_balanced());

        let expenses = session.commit(&mut ledger).unwrap();
        assert_eq!(session.state(), SplitState::Committed);
        assert_eq!(expenses.len(), 2);
        for expense in &expenses {
            assert!(expense.is_split_entry());
            assert!(expense.from_bank_feed);
            assert_eq!(expense.linked_bank_txn_ids, vec![txn_id]);
        }
        assert_eq!(
            ledger.bank_txn(txn_id).unwrap().status,
            BankTxnStatus::Linked
        );
        assert!(ledger.linked_txns_balanced());
    }

    #[test]
    fn test_lines_can_target_different_vehicles() {
        let (mut ledger, taxonomy, txn_id, vehicle) = setup(5000);
        let other_vehicle = VehicleId::new();
        let mut session = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap();

        session
            .update_line(
                &taxonomy,
                0,
                LineUpdate {
                    amount: Some(Money::from_rupees(3000)),
                    ..Default::default()
                },
            )
            .unwrap();
        let idx = session.add_line(&taxonomy).unwrap();
        session
            .update_line(
                &taxonomy,
                idx,
                LineUpdate {
                    vehicle_id: Some(other_vehicle),
                    ..Default::default()
                },
            )
            .unwrap();

        let expenses = session.commit(&mut ledger).unwrap();
        assert_eq!(expenses[0].vehicle_id, vehicle);
        assert_eq!(expenses[1].vehicle_id, other_vehicle);
    }

    #[test]
    fn test_commit_imbalance_reports_remainder() {
        // Spec scenario: ₹4999 allocated against a ₹5000 transaction
        let (mut ledger, taxonomy, txn_id, vehicle) = setup(5000);
        let mut session = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap();

        session
            .update_line(
                &taxonomy,
                0,
                LineUpdate {
                    amount: Some(Money::from_rupees(4999)),
                    ..Default::default()
                },
            )
            .unwrap();

        let err = session.commit(&mut ledger).unwrap_err();
        match err {
            LedgerError::Reconciliation(ReconciliationError::Imbalance { remainder }) => {
                assert_eq!(remainder, Money::from_rupees(1));
            }
            other => panic!("expected imbalance, got {other}"),
        }

        // Nothing was committed
        assert_eq!(session.state(), SplitState::Editing);
        assert!(ledger.expenses.is_empty());
        assert!(ledger.bank_txn(txn_id).unwrap().is_pending());
    }

    #[test]
    fn test_one_paisa_drift_tolerated() {
        let (mut ledger, taxonomy, txn_id, vehicle) = setup(5000);
        let mut session = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap();
        session
            .update_line(
                &taxonomy,
                0,
                LineUpdate {
                    amount: Some(Money::from_paise(499_999)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(session.is_balanced());
        assert!(session.commit(&mut ledger).is_ok());
    }

    #[test]
    fn test_add_line_refused_when_fully_allocated() {
        let (ledger, taxonomy, txn_id, vehicle) = setup(5000);
        let mut session = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap();

        let err = session.add_line(&taxonomy).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn test_remove_last_line_is_empty_split() {
        let (ledger, taxonomy, txn_id, vehicle) = setup(5000);
        let mut session = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap();

        let err = session.remove_line(0).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Reconciliation(ReconciliationError::EmptySplit)
        ));
    }

    #[test]
    fn test_tax_recomputes_until_overridden() {
        let (ledger, taxonomy, txn_id, vehicle) = setup(1180);
        let mut session = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap();

        // Switch to a taxed category: tax follows automatically
        session
            .update_line(
                &taxonomy,
                0,
                LineUpdate {
                    category: Some(ExpenseCategory::Maintenance),
                    ..Default::default()
                },
            )
            .unwrap();
        let auto_tax = session.lines()[0].tax_amount;
        assert_eq!(session.lines()[0].tax_rate, 18);
        assert!(auto_tax.is_positive());

        // Manual override sticks through subsequent edits
        session
            .update_line(
                &taxonomy,
                0,
                LineUpdate {
                    tax_amount: Some(Money::from_rupees(7)),
                    ..Default::default()
                },
            )
            .unwrap();
        session
            .update_line(
                &taxonomy,
                0,
                LineUpdate {
                    amount: Some(Money::from_rupees(1000)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(session.lines()[0].tax_amount, Money::from_rupees(7));

        // Reset returns to the suggested value
        session.reset_tax(&taxonomy, 0).unwrap();
        assert_eq!(
            session.lines()[0].tax_amount,
            tax::tax_from_gross(Money::from_rupees(1000), 18)
        );
    }

    #[test]
    fn test_manual_tax_must_stay_within_line_amount() {
        let (ledger, taxonomy, txn_id, vehicle) = setup(5000);
        let mut session = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap();

        let err = session
            .update_line(
                &taxonomy,
                0,
                LineUpdate {
                    tax_amount: Some(Money::from_rupees(7000)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let err = session
            .update_line(
                &taxonomy,
                0,
                LineUpdate {
                    tax_amount: Some(Money::from_rupees(-100)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        // Rejected edits leave the line untouched
        assert_eq!(session.lines()[0].tax_amount, Money::zero());
        assert!(!session.lines()[0].tax_overridden);
    }

    #[test]
    fn test_shrinking_amount_below_overridden_tax_is_rejected() {
        let (ledger, taxonomy, txn_id, vehicle) = setup(5000);
        let mut session = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap();

        session
            .update_line(
                &taxonomy,
                0,
                LineUpdate {
                    tax_amount: Some(Money::from_rupees(900)),
                    ..Default::default()
                },
            )
            .unwrap();

        let err = session
            .update_line(
                &taxonomy,
                0,
                LineUpdate {
                    amount: Some(Money::from_rupees(500)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(session.lines()[0].amount, Money::from_rupees(5000));
    }

    #[test]
    fn test_commit_rejects_out_of_range_tax() {
        let (mut ledger, taxonomy, txn_id, vehicle) = setup(5000);
        let mut session = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap();

        // Plant a bad value directly; every committed expense must still
        // honor 0 <= tax <= amount
        session.lines[0].tax_amount = Money::from_rupees(7000);
        session.lines[0].tax_overridden = true;

        let err = session.commit(&mut ledger).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(ledger.expenses.is_empty());
        assert!(ledger.bank_txn(txn_id).unwrap().is_pending());

        session.lines[0].tax_amount = Money::from_rupees(-100);
        let err = session.commit(&mut ledger).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(ledger.expenses.is_empty());
        assert!(ledger.bank_txn(txn_id).unwrap().is_pending());
    }

    #[test]
    fn test_abort_leaves_ledger_untouched() {
        let (mut ledger, taxonomy, txn_id, vehicle) = setup(5000);
        let mut session = SplitSession::new(&ledger, &taxonomy, txn_id, vehicle).unwrap();
        session.abort();

        assert_eq!(session.state(), SplitState::Aborted);
        assert!(ledger.bank_txn(txn_id).unwrap().is_pending());
        // No further edits accepted
        assert!(session.add_line(&taxonomy).is_err());
        assert!(session.commit(&mut ledger).is_err());
    }
}
