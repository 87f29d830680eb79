//! Expense service
//!
//! Shell-side CRUD for manual expenses: validation against the taxonomy,
//! tax derivation when the caller doesn't supply one, filtered listing, and
//! audit logging. The reconciliation core never goes through this service;
//! it operates on ledger snapshots directly.

use chrono::NaiveDate;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Expense, ExpenseCategory, ExpenseId, Money, PaymentMethod, Taxonomy, VehicleId,
};
use crate::storage::Storage;
use crate::tax;

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
    taxonomy: &'a Taxonomy,
}

/// Options for filtering expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Filter by category
    pub category: Option<ExpenseCategory>,
    /// Filter by vehicle
    pub vehicle_id: Option<VehicleId>,
    /// Filter by date range start
    pub start_date: Option<NaiveDate>,
    /// Filter by date range end
    pub end_date: Option<NaiveDate>,
    /// Maximum number of expenses to return
    pub limit: Option<usize>,
}

impl ExpenseFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by category
    pub fn category(mut self, category: ExpenseCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Filter by vehicle
    pub fn vehicle(mut self, vehicle_id: VehicleId) -> Self {
        self.vehicle_id = Some(vehicle_id);
        self
    }

    /// Filter by date range
    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Input for creating a new expense
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    pub date: NaiveDate,
    pub amount: Money,
    pub category: ExpenseCategory,
    pub sub_category: Option<String>,
    pub vehicle_id: VehicleId,
    pub description: Option<String>,
    pub vendor: Option<String>,
    /// Manual tax override; when absent the taxonomy suggestion applies
    pub tax_amount: Option<Money>,
    pub invoice_number: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

/// Field updates for an existing expense. `None` leaves the field as-is.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    pub date: Option<NaiveDate>,
    pub amount: Option<Money>,
    pub category: Option<ExpenseCategory>,
    pub sub_category: Option<String>,
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub tax_amount: Option<Money>,
    pub invoice_number: Option<String>,
}

impl<'a> ExpenseService<'a> {
    /// Create a new expense service
    pub fn new(storage: &'a Storage, taxonomy: &'a Taxonomy) -> Self {
        Self { storage, taxonomy }
    }

    /// Create a new manual expense
    pub fn create(&self, input: CreateExpenseInput) -> LedgerResult<Expense> {
        // Verify the vehicle exists
        self.storage
            .vehicles
            .get(input.vehicle_id)?
            .ok_or_else(|| LedgerError::vehicle_not_found(input.vehicle_id.to_string()))?;

        let sub_category = input.sub_category.unwrap_or_else(|| {
            self.taxonomy
                .default_sub_category(input.category)
                .to_string()
        });

        let mut expense = Expense::new(
            input.date,
            input.amount,
            input.category,
            sub_category,
            input.vehicle_id,
        );

        if let Some(description) = input.description {
            expense.description = description.trim().to_string();
        }
        if let Some(vendor) = input.vendor {
            let vendor = vendor.trim().to_string();
            if !vendor.is_empty() {
                expense.vendor = Some(vendor);
            }
        }
        expense.invoice_number = input.invoice_number;
        expense.has_invoice_copy = expense.invoice_number.is_some();
        if let Some(method) = input.payment_method {
            expense.payment_method = method;
        }

        match input.tax_amount {
            Some(tax_amount) => {
                // Manual override: keep the amount, drop the slab marker
                expense.tax_amount = tax_amount;
                expense.tax_rate = 0;
            }
            None => {
                let rate = tax::suggest_rate(self.taxonomy, expense.category, &expense.sub_category);
                expense.tax_rate = rate;
                expense.tax_amount = tax::tax_from_gross(expense.amount, rate);
            }
        }

        expense
            .validate(self.taxonomy)
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage.log_create(
            EntityType::Expense,
            expense.id.to_string(),
            expense.vendor.clone(),
            &expense,
        )?;

        Ok(expense)
    }

    /// Get an expense by ID
    pub fn get(&self, id: ExpenseId) -> LedgerResult<Option<Expense>> {
        self.storage.expenses.get(id)
    }

    /// List expenses with optional filtering, in stored order
    pub fn list(&self, filter: ExpenseFilter) -> LedgerResult<Vec<Expense>> {
        let mut expenses = if let Some(vehicle_id) = filter.vehicle_id {
            self.storage.expenses.get_by_vehicle(vehicle_id)?
        } else {
            self.storage.expenses.get_all()?
        };

        if let Some(category) = filter.category {
            expenses.retain(|e| e.category == category);
        }
        if let Some(start) = filter.start_date {
            expenses.retain(|e| e.date >= start);
        }
        if let Some(end) = filter.end_date {
            expenses.retain(|e| e.date <= end);
        }
        if let Some(limit) = filter.limit {
            expenses.truncate(limit);
        }

        Ok(expenses)
    }

    /// Update an expense
    pub fn update(&self, id: ExpenseId, input: UpdateExpenseInput) -> LedgerResult<Expense> {
        let mut expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| LedgerError::expense_not_found(id.to_string()))?;

        let before = expense.clone();
        let mut amount_changed = false;

        if let Some(date) = input.date {
            expense.date = date;
        }
        if let Some(amount) = input.amount {
            expense.amount = amount;
            amount_changed = true;
        }
        if let Some(category) = input.category {
            expense.category = category;
            if input.sub_category.is_none() {
                expense.sub_category = self.taxonomy.default_sub_category(category).to_string();
            }
            amount_changed = true;
        }
        if let Some(sub_category) = input.sub_category {
            expense.sub_category = sub_category;
            amount_changed = true;
        }
        if let Some(description) = input.description {
            expense.description = description;
        }
        if let Some(vendor) = input.vendor {
            let vendor = vendor.trim().to_string();
            expense.vendor = (!vendor.is_empty()).then_some(vendor);
        }
        if let Some(invoice_number) = input.invoice_number {
            expense.invoice_number = Some(invoice_number);
            expense.has_invoice_copy = true;
        }

        match input.tax_amount {
            Some(tax_amount) => {
                expense.tax_amount = tax_amount;
                expense.tax_rate = 0;
            }
            None if amount_changed => {
                let rate = tax::suggest_rate(self.taxonomy, expense.category, &expense.sub_category);
                expense.tax_rate = rate;
                expense.tax_amount = tax::tax_from_gross(expense.amount, rate);
            }
            None => {}
        }

        expense.touch();
        expense
            .validate(self.taxonomy)
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage.log_update(
            EntityType::Expense,
            expense.id.to_string(),
            expense.vendor.clone(),
            &before,
            &expense,
        )?;

        Ok(expense)
    }

    /// Delete an expense
    pub fn delete(&self, id: ExpenseId) -> LedgerResult<Expense> {
        let expense = self
            .storage
            .expenses
            .delete(id)?
            .ok_or_else(|| LedgerError::expense_not_found(id.to_string()))?;

        self.storage.expenses.save()?;

        self.storage.log_delete(
            EntityType::Expense,
            expense.id.to_string(),
            expense.vendor.clone(),
            &expense,
        )?;

        Ok(expense)
    }
}
