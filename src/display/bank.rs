//! Bank feed display formatting
//!
//! Terminal table for the bank feed with status icons, plus a detail view.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::{BankTransaction, BankTxnStatus};

/// Status icon for a bank transaction
pub fn status_icon(status: BankTxnStatus) -> &'static str {
    match status {
        BankTxnStatus::Pending => "·",
        BankTxnStatus::Linked => "✓",
        BankTxnStatus::Excluded => "✗",
    }
}

#[derive(Tabled)]
struct BankTxnRow {
    #[tabled(rename = "")]
    icon: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl BankTxnRow {
    fn from_txn(txn: &BankTransaction) -> Self {
        Self {
            icon: status_icon(txn.status).to_string(),
            id: txn.id.to_string(),
            date: txn.date.format("%Y-%m-%d").to_string(),
            description: txn.description.clone(),
            amount: txn.amount.to_string(),
            status: txn.status.to_string(),
        }
    }
}

/// Format the bank feed as a table
pub fn format_bank_feed(txns: &[BankTransaction]) -> String {
    if txns.is_empty() {
        return "No bank transactions found.\n".to_string();
    }

    let rows: Vec<BankTxnRow> = txns.iter().map(BankTxnRow::from_txn).collect();
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .modify(Columns::single(4), Alignment::right());
    table.to_string()
}

/// Format bank transaction details for display
pub fn format_bank_txn_details(txn: &BankTransaction) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.date.format("%Y-%m-%d")));
    output.push_str(&format!("Amount:      {}\n", txn.amount));
    output.push_str(&format!("Narration:   {}\n", txn.description));
    output.push_str(&format!("Status:      {}\n", txn.status));

    if let Some(expense_id) = txn.potential_match {
        output.push_str(&format!("Match hint:  {}\n", expense_id));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;

    fn sample() -> BankTransaction {
        BankTransaction::new(
            NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            Money::from_rupees(5000),
            "IOCL PETROL PUMP",
        )
    }

    #[test]
    fn test_status_icons() {
        assert_eq!(status_icon(BankTxnStatus::Pending), "·");
        assert_eq!(status_icon(BankTxnStatus::Linked), "✓");
        assert_eq!(status_icon(BankTxnStatus::Excluded), "✗");
    }

    #[test]
    fn test_feed_table() {
        let table = format_bank_feed(&[sample()]);
        assert!(table.contains("IOCL PETROL PUMP"));
        assert!(table.contains("Pending"));
    }

    #[test]
    fn test_empty_feed() {
        assert_eq!(format_bank_feed(&[]), "No bank transactions found.\n");
    }
}
