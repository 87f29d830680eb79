//! Expense display formatting
//!
//! Terminal tables for expense lists and a plain-text detail view.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::Expense;

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "GST")]
    tax: String,
    #[tabled(rename = "")]
    flags: String,
}

impl ExpenseRow {
    fn from_expense(expense: &Expense) -> Self {
        let mut flags = String::new();
        if expense.from_bank_feed {
            flags.push('🏦');
        }
        if expense.is_split_entry() {
            flags.push('✂');
        }

        Self {
            id: expense.id.to_string(),
            date: expense.date.format("%Y-%m-%d").to_string(),
            vendor: expense
                .vendor
                .clone()
                .unwrap_or_else(|| expense.description.clone()),
            category: format!("{}/{}", expense.category, expense.sub_category),
            amount: expense.amount.to_string(),
            tax: if expense.tax_amount.is_zero() {
                "-".to_string()
            } else {
                format!("{} ({}%)", expense.tax_amount, expense.tax_rate)
            },
            flags,
        }
    }
}

/// Format a list of expenses as a table
pub fn format_expense_table(expenses: &[Expense]) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let rows: Vec<ExpenseRow> = expenses.iter().map(ExpenseRow::from_expense).collect();
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .modify(Columns::single(4), Alignment::right())
        .modify(Columns::single(5), Alignment::right());
    table.to_string()
}

/// Format expense details for display
pub fn format_expense_details(expense: &Expense) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:     {}\n", expense.id));
    output.push_str(&format!("Date:        {}\n", expense.date.format("%Y-%m-%d")));
    output.push_str(&format!("Amount:      {}\n", expense.amount));
    output.push_str(&format!(
        "Category:    {}/{}\n",
        expense.category, expense.sub_category
    ));

    if let Some(vendor) = &expense.vendor {
        output.push_str(&format!("Vendor:      {}\n", vendor));
    }
    if !expense.description.is_empty() {
        output.push_str(&format!("Description: {}\n", expense.description));
    }

    output.push_str(&format!(
        "GST:         {} ({}%)\n",
        expense.tax_amount, expense.tax_rate
    ));

    if let Some(invoice) = &expense.invoice_number {
        output.push_str(&format!("Invoice:     {}\n", invoice));
    }
    output.push_str(&format!("Paid via:    {}\n", expense.payment_method));
    output.push_str(&format!("Vehicle:     {}\n", expense.vehicle_id));

    if !expense.linked_bank_txn_ids.is_empty() {
        let ids: Vec<String> = expense
            .linked_bank_txn_ids
            .iter()
            .map(|id| id.to_string())
            .collect();
        output.push_str(&format!("Bank links:  {}\n", ids.join(", ")));
    }
    if !expense.tags.is_empty() {
        output.push_str(&format!("Tags:        {}\n", expense.tags.join(", ")));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, Money, VehicleId, SPLIT_TAG};
    use chrono::NaiveDate;

    fn sample() -> Expense {
        let mut expense = Expense::new(
            NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            Money::from_rupees(15000),
            ExpenseCategory::Fuel,
            "Diesel",
            VehicleId::new(),
        );
        expense.vendor = Some("HPCL Station".to_string());
        expense
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(format_expense_table(&[]), "No expenses found.\n");
    }

    #[test]
    fn test_table_contains_fields() {
        let table = format_expense_table(&[sample()]);
        assert!(table.contains("HPCL Station"));
        assert!(table.contains("Fuel/Diesel"));
        assert!(table.contains("₹15000.00"));
    }

    #[test]
    fn test_details_show_split_tag() {
        let mut expense = sample();
        expense.add_tag(SPLIT_TAG);
        let details = format_expense_details(&expense);
        assert!(details.contains("split-entry"));
        assert!(details.contains("HPCL Station"));
    }
}
