//! CSV export functionality
//!
//! Exports the expense ledger to spreadsheet-compatible CSV.

use std::collections::HashMap;
use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::storage::Storage;

/// Export all expenses to CSV
pub fn export_expenses_csv<W: Write>(storage: &Storage, writer: &mut W) -> LedgerResult<()> {
    let vehicles = storage.vehicles.get_all()?;
    let vehicle_names: HashMap<_, _> = vehicles
        .iter()
        .map(|v| (v.id, v.reg_number.clone()))
        .collect();

    writeln!(
        writer,
        "ID,Date,Vendor,Category,Sub-category,Vehicle,Amount,GST Amount,GST Rate,Invoice,Payment Method,From Bank Feed,Tags"
    )
    .map_err(|e| LedgerError::Export(e.to_string()))?;

    let expenses = storage.expenses.get_all()?;

    for expense in expenses {
        let vehicle = vehicle_names
            .get(&expense.vehicle_id)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());

        writeln!(
            writer,
            "{},{},{},{},{},{},{:.2},{:.2},{},{},{},{},{}",
            expense.id,
            expense.date,
            escape_csv(expense.vendor.as_deref().unwrap_or("")),
            expense.category,
            escape_csv(&expense.sub_category),
            escape_csv(&vehicle),
            expense.amount.paise() as f64 / 100.0,
            expense.tax_amount.paise() as f64 / 100.0,
            expense.tax_rate,
            escape_csv(expense.invoice_number.as_deref().unwrap_or("")),
            expense.payment_method,
            expense.from_bank_feed,
            escape_csv(&expense.tags.join(";"))
        )
        .map_err(|e| LedgerError::Export(e.to_string()))?;
    }

    Ok(())
}

/// Export the bank feed to CSV
pub fn export_bank_txns_csv<W: Write>(storage: &Storage, writer: &mut W) -> LedgerResult<()> {
    writeln!(writer, "ID,Date,Description,Amount,Status")
        .map_err(|e| LedgerError::Export(e.to_string()))?;

    for txn in storage.bank_txns.get_all()? {
        writeln!(
            writer,
            "{},{},{},{:.2},{}",
            txn.id,
            txn.date,
            escape_csv(&txn.description),
            txn.amount.paise() as f64 / 100.0,
            txn.status
        )
        .map_err(|e| LedgerError::Export(e.to_string()))?;
    }

    Ok(())
}

/// Escape a CSV field if it contains special characters
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FleetPaths;
    use crate::models::{Expense, ExpenseCategory, Money, Vehicle};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_export_expenses() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FleetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let vehicle = Vehicle::new("KA-01-AB-1234", "Tata Ace");
        let vehicle_id = vehicle.id;
        storage.vehicles.upsert(vehicle).unwrap();

        let mut expense = Expense::new(
            NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            Money::from_rupees(15000),
            ExpenseCategory::Fuel,
            "Diesel",
            vehicle_id,
        );
        expense.vendor = Some("HPCL Station, Hosur Rd".to_string());
        storage.expenses.upsert(expense).unwrap();

        let mut output = Vec::new();
        export_expenses_csv(&storage, &mut output).unwrap();
        let csv_text = String::from_utf8(output).unwrap();

        assert!(csv_text.starts_with("ID,Date,Vendor"));
        assert!(csv_text.contains("\"HPCL Station, Hosur Rd\""));
        assert!(csv_text.contains("15000.00"));
        assert!(csv_text.contains("KA-01-AB-1234"));
    }
}
