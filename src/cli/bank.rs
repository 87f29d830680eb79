//! Bank feed CLI commands
//!
//! Import, listing, candidate lookup, link/create/exclude. Mutating
//! commands load the ledger snapshot, run the reconciliation core, and
//! store the snapshot back.

use clap::Subcommand;

use crate::audit::{AuditEntry, EntityType};
use crate::config::Settings;
use crate::display::{format_bank_feed, format_bank_txn_details, format_expense_table};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{BankTxnStatus, ExpenseCategory, Taxonomy};
use crate::services::matcher;
use crate::services::{FeedMapping, ImportService, ImportStatus};
use crate::storage::Storage;

/// Bank feed subcommands
#[derive(Subcommand)]
pub enum BankCommands {
    /// Import a bank statement CSV
    Import {
        /// Path to the CSV file
        file: String,
        /// Date format in the statement (strftime)
        #[arg(long, default_value = "%Y-%m-%d")]
        date_format: String,
        /// The CSV has no header row
        #[arg(long)]
        no_header: bool,
        /// Column delimiter
        #[arg(long, default_value = ",")]
        delimiter: char,
        /// Preview without importing
        #[arg(long)]
        dry_run: bool,
    },
    /// List bank transactions
    List {
        /// Only show pending transactions
        #[arg(short, long)]
        pending: bool,
        /// Include excluded transactions
        #[arg(long)]
        all: bool,
    },
    /// Show matching manual expenses for a pending transaction
    Candidates {
        /// Bank transaction ID
        txn: String,
    },
    /// Link a pending transaction to an existing expense
    Link {
        /// Bank transaction ID
        txn: String,
        /// Expense ID
        expense: String,
    },
    /// Create an expense directly from a pending transaction
    Create {
        /// Bank transaction ID
        txn: String,
        /// Vehicle registration number or ID; falls back to the configured
        /// default vehicle
        #[arg(short, long)]
        vehicle: Option<String>,
        /// Category for the new expense
        #[arg(short, long, default_value = "fuel")]
        category: String,
        /// Sub-category; defaults to the category's first entry
        #[arg(short, long)]
        sub_category: Option<String>,
    },
    /// Mark transactions as personal/non-business
    Exclude {
        /// Bank transaction IDs
        txns: Vec<String>,
    },
}

/// Handle a bank command
pub fn handle_bank_command(
    storage: &Storage,
    taxonomy: &Taxonomy,
    settings: &Settings,
    cmd: BankCommands,
) -> LedgerResult<()> {
    match cmd {
        BankCommands::Import {
            file,
            date_format,
            no_header,
            delimiter,
            dry_run,
        } => {
            let service = ImportService::new(storage);
            let mapping = FeedMapping::new()
                .with_date_format(&date_format)
                .with_header(!no_header)
                .with_delimiter(delimiter);

            if dry_run {
                let mut reader = csv::ReaderBuilder::new()
                    .has_headers(mapping.has_header)
                    .delimiter(mapping.delimiter as u8)
                    .flexible(true)
                    .from_path(&file)
                    .map_err(|e| LedgerError::Import(e.to_string()))?;
                let parsed = service.parse_csv_from_reader(&mut reader, &mapping)?;
                let preview = service.generate_preview(&parsed)?;

                for entry in &preview {
                    match (&entry.status, &entry.line) {
                        (ImportStatus::New, Some(line)) => {
                            println!("new        {} {} {}", line.date, line.amount, line.description)
                        }
                        (ImportStatus::Duplicate, Some(line)) => {
                            println!("duplicate  {} {} {}", line.date, line.amount, line.description)
                        }
                        (ImportStatus::Error(msg), _) => println!("error      {}", msg),
                        _ => {}
                    }
                }
                return Ok(());
            }

            let result = service.import_file(std::path::Path::new(&file), &mapping)?;
            println!(
                "Imported {} transaction(s), skipped {} duplicate(s), {} error(s)",
                result.imported, result.duplicates_skipped, result.errors
            );
            for (row, msg) in &result.error_messages {
                println!("  row {}: {}", row + 1, msg);
            }
        }

        BankCommands::List { pending, all } => {
            let txns = if pending {
                storage.bank_txns.get_by_status(BankTxnStatus::Pending)?
            } else {
                let mut txns = storage.bank_txns.get_all()?;
                if !all && !settings.show_excluded {
                    txns.retain(|t| t.status != BankTxnStatus::Excluded);
                }
                txns
            };
            println!("{}", format_bank_feed(&txns));
        }

        BankCommands::Candidates { txn } => {
            let txn_id = super::resolve_bank_txn_id(storage, &txn)?;
            let ledger = storage.load_ledger()?;
            let candidates = matcher::find_candidates(&ledger, txn_id)?;

            let found = ledger
                .bank_txn(txn_id)
                .ok_or_else(|| LedgerError::bank_txn_not_found(&txn))?;
            print!("{}", format_bank_txn_details(found));
            println!();

            if candidates.is_empty() {
                println!("No matching manual expenses.");
            } else {
                let owned: Vec<_> = candidates.into_iter().cloned().collect();
                println!("{}", format_expense_table(&owned));
            }
        }

        BankCommands::Link { txn, expense } => {
            let txn_id = super::resolve_bank_txn_id(storage, &txn)?;
            let expense_id = super::resolve_expense_id(storage, &expense)?;

            let mut ledger = storage.load_ledger()?;
            let outcome = matcher::link_existing(&mut ledger, txn_id, expense_id)?;
            storage.store_ledger(&ledger)?;

            storage.log_update(
                EntityType::BankTransaction,
                txn_id.to_string(),
                Some(outcome.txn.description.clone()),
                &BankTxnStatus::Pending,
                &outcome.txn.status,
            )?;

            println!("Linked {} to {}", outcome.txn.id, outcome.expense.id);
        }

        BankCommands::Create {
            txn,
            vehicle,
            category,
            sub_category,
        } => {
            let txn_id = super::resolve_bank_txn_id(storage, &txn)?;
            let vehicle = super::resolve_vehicle_or_default(storage, settings, vehicle.as_deref())?;
            let category = category
                .parse::<ExpenseCategory>()
                .map_err(LedgerError::Validation)?;

            let mut ledger = storage.load_ledger()?;
            let expense = matcher::quick_create(
                &mut ledger,
                taxonomy,
                txn_id,
                category,
                sub_category.as_deref(),
                vehicle.id,
            )?;
            storage.store_ledger(&ledger)?;

            storage.log_create(
                EntityType::Expense,
                expense.id.to_string(),
                expense.vendor.clone(),
                &expense,
            )?;

            println!("Created expense {} from {}", expense.id, txn_id);
        }

        BankCommands::Exclude { txns } => {
            if txns.is_empty() {
                return Err(LedgerError::Validation(
                    "no transaction ids given".to_string(),
                ));
            }

            let txn_ids = txns
                .iter()
                .map(|t| super::resolve_bank_txn_id(storage, t))
                .collect::<LedgerResult<Vec<_>>>()?;

            let mut ledger = storage.load_ledger()?;
            let outcome = matcher::bulk_exclude(&mut ledger, &txn_ids);
            storage.store_ledger(&ledger)?;

            let audit_entries: Vec<AuditEntry> = outcome
                .succeeded
                .iter()
                .map(|id| {
                    AuditEntry::update(
                        EntityType::BankTransaction,
                        id.to_string(),
                        None,
                        &BankTxnStatus::Pending,
                        &BankTxnStatus::Excluded,
                    )
                })
                .collect();
            storage.audit().log_batch(&audit_entries)?;

            println!("Excluded {} transaction(s)", outcome.succeeded.len());
            for (id, err) in &outcome.failed {
                println!("  {}: {}", id, err);
            }
        }
    }

    Ok(())
}
