//! Duplicate group display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::ledger::Ledger;
use crate::services::duplicates::DuplicateGroup;

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Group")]
    group: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Bank links")]
    links: usize,
}

/// Format duplicate groups as a table, one row per member
pub fn format_duplicate_groups(ledger: &Ledger, groups: &[DuplicateGroup]) -> String {
    if groups.is_empty() {
        return "No duplicate expenses found.\n".to_string();
    }

    let mut rows = Vec::new();
    for (idx, group) in groups.iter().enumerate() {
        for id in &group.expense_ids {
            if let Some(expense) = ledger.expense(*id) {
                rows.push(GroupRow {
                    group: idx + 1,
                    id: expense.id.to_string(),
                    date: expense.date.format("%Y-%m-%d").to_string(),
                    vendor: expense
                        .vendor
                        .clone()
                        .unwrap_or_else(|| expense.description.clone()),
                    amount: expense.amount.to_string(),
                    links: expense.linked_bank_txn_ids.len(),
                });
            }
        }
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!(
        "{} duplicate group(s) found:\n{}",
        groups.len(),
        table
    )
}
