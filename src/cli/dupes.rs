//! Duplicate detection CLI commands

use clap::Subcommand;

use crate::audit::EntityType;
use crate::display::format_duplicate_groups;
use crate::error::{LedgerError, LedgerResult};
use crate::services::{duplicates, DuplicateScan};
use crate::storage::Storage;

/// Duplicate subcommands
#[derive(Subcommand)]
pub enum DupesCommands {
    /// Scan manual expenses for likely duplicates
    Scan,
    /// Merge two duplicate expenses, keeping one
    Resolve {
        /// Expense ID to keep
        #[arg(long)]
        keep: String,
        /// Expense ID to delete
        #[arg(long)]
        drop: String,
    },
}

/// Handle a dupes command
pub fn handle_dupes_command(storage: &Storage, cmd: DupesCommands) -> LedgerResult<()> {
    match cmd {
        DupesCommands::Scan => {
            let ledger = storage.load_ledger()?;
            let scan = DuplicateScan::new();
            let groups = scan.find_groups(&ledger);
            if groups.is_empty() {
                println!("No duplicate groups found.");
            } else {
                println!("{}", format_duplicate_groups(&ledger, &groups));
            }
        }

        DupesCommands::Resolve { keep, drop } => {
            let keep_id = super::resolve_expense_id(storage, &keep)?;
            let drop_id = super::resolve_expense_id(storage, &drop)?;
            if keep_id == drop_id {
                return Err(LedgerError::Validation(
                    "keep and drop refer to the same expense".to_string(),
                ));
            }

            let mut ledger = storage.load_ledger()?;
            let dropped = ledger
                .expense(drop_id)
                .cloned()
                .ok_or_else(|| LedgerError::expense_not_found(&drop))?;
            let survivor = duplicates::merge(&mut ledger, keep_id, drop_id)?;
            storage.store_ledger(&ledger)?;

            storage.log_delete(
                EntityType::Expense,
                drop_id.to_string(),
                dropped.vendor.clone(),
                &dropped,
            )?;

            println!("Merged {} into {}", drop_id, survivor.id);
        }
    }
    Ok(())
}
