//! Split CLI command
//!
//! One-shot split: line specs are given as `AMOUNT:CATEGORY[:SUB[:DESCRIPTION]]`
//! arguments, the session is built and committed in a single invocation.
//! With `--preview` (or no line specs) the session is shown and discarded.

use clap::Args;

use crate::audit::{AuditEntry, EntityType};
use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{BankTxnStatus, Taxonomy};
use crate::services::{LineUpdate, SplitSession};
use crate::storage::Storage;

use super::expense::{parse_category, parse_money};

/// Arguments for `split`
#[derive(Args)]
pub struct SplitArgs {
    /// Bank transaction ID
    pub txn: String,
    /// Vehicle registration number or ID for the resulting expenses;
    /// falls back to the configured default vehicle
    #[arg(short, long)]
    pub vehicle: Option<String>,
    /// Split line as AMOUNT:CATEGORY[:SUB[:DESCRIPTION]]; repeatable
    #[arg(short, long = "line")]
    pub lines: Vec<String>,
    /// Show the split without committing
    #[arg(long)]
    pub preview: bool,
}

struct LineSpec {
    update: LineUpdate,
}

fn parse_line_spec(spec: &str) -> LedgerResult<LineSpec> {
    let parts: Vec<&str> = spec.splitn(4, ':').collect();
    if parts.len() < 2 {
        return Err(LedgerError::Validation(format!(
            "invalid line spec '{}': expected AMOUNT:CATEGORY[:SUB[:DESCRIPTION]]",
            spec
        )));
    }

    let update = LineUpdate {
        amount: Some(parse_money(parts[0])?),
        category: Some(parse_category(parts[1])?),
        sub_category: parts.get(2).filter(|s| !s.is_empty()).map(|s| s.to_string()),
        description: parts.get(3).filter(|s| !s.is_empty()).map(|s| s.to_string()),
        vehicle_id: None,
        tax_amount: None,
    };
    Ok(LineSpec { update })
}

fn print_session(session: &SplitSession) {
    println!("{:<4} {:>12} {:<14} {:<18} {:>10}", "#", "Amount", "Category", "Sub-category", "GST");
    for (i, line) in session.lines().iter().enumerate() {
        println!(
            "{:<4} {:>12} {:<14} {:<18} {:>10}",
            i + 1,
            line.amount.to_string(),
            line.category.to_string(),
            line.sub_category,
            line.tax_amount.to_string(),
        );
    }
    println!();
    println!("Allocated: {}", session.allocated());
    println!("Remainder: {}", session.remainder());
    if !session.is_balanced() {
        println!("Split does not balance; allocate the remainder before committing.");
    }
}

/// Handle the split command
pub fn handle_split_command(
    storage: &Storage,
    taxonomy: &Taxonomy,
    settings: &Settings,
    args: SplitArgs,
) -> LedgerResult<()> {
    let txn_id = super::resolve_bank_txn_id(storage, &args.txn)?;
    let vehicle = super::resolve_vehicle_or_default(storage, settings, args.vehicle.as_deref())?;

    let mut ledger = storage.load_ledger()?;
    let mut session = SplitSession::new(&ledger, taxonomy, txn_id, vehicle.id)?;

    // First spec edits the seeded full-amount line, the rest add lines
    for (i, spec) in args.lines.iter().enumerate() {
        let spec = parse_line_spec(spec)?;
        let index = if i == 0 {
            0
        } else {
            session.add_line(taxonomy)?
        };
        session.update_line(taxonomy, index, spec.update)?;
    }

    if args.preview || args.lines.is_empty() {
        print_session(&session);
        session.abort();
        return Ok(());
    }

    let expenses = session.commit(&mut ledger)?;
    storage.store_ledger(&ledger)?;

    let mut audit_entries: Vec<AuditEntry> = expenses
        .iter()
        .map(|e| {
            AuditEntry::create(EntityType::Expense, e.id.to_string(), e.vendor.clone(), e)
        })
        .collect();
    audit_entries.push(AuditEntry::update(
        EntityType::BankTransaction,
        txn_id.to_string(),
        None,
        &BankTxnStatus::Pending,
        &BankTxnStatus::Linked,
    ));
    storage.audit().log_batch(&audit_entries)?;

    println!("Split {} into {} expense(s):", txn_id, expenses.len());
    for e in &expenses {
        println!("  {} {} {} / {}", e.id, e.amount, e.category, e.sub_category);
    }
    Ok(())
}
