//! Export CLI commands

use std::fs::File;
use std::io::{self, BufWriter, Write};

use clap::Subcommand;

use crate::error::{LedgerError, LedgerResult};
use crate::export::{export_bank_txns_csv, export_expenses_csv, export_full_json, export_full_yaml};
use crate::storage::Storage;

/// Export subcommands
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export expenses (or the bank feed) as CSV
    Csv {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
        /// Export the bank feed instead of expenses
        #[arg(long)]
        bank: bool,
    },
    /// Export all data as JSON
    Json {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Export all data as YAML
    Yaml {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn with_writer<F>(output: Option<&str>, f: F) -> LedgerResult<()>
where
    F: FnOnce(&mut dyn Write) -> LedgerResult<()>,
{
    match output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| LedgerError::Export(format!("cannot create {}: {}", path, e)))?;
            let mut writer = BufWriter::new(file);
            f(&mut writer)?;
            writer
                .flush()
                .map_err(|e| LedgerError::Export(e.to_string()))?;
            println!("Exported to {}", path);
            Ok(())
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            f(&mut lock)
        }
    }
}

/// Handle an export command
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> LedgerResult<()> {
    match cmd {
        ExportCommands::Csv { output, bank } => with_writer(output.as_deref(), |mut w| {
            if bank {
                export_bank_txns_csv(storage, &mut w)
            } else {
                export_expenses_csv(storage, &mut w)
            }
        }),
        ExportCommands::Json { output } => {
            with_writer(output.as_deref(), |mut w| export_full_json(storage, &mut w))
        }
        ExportCommands::Yaml { output } => {
            with_writer(output.as_deref(), |mut w| export_full_yaml(storage, &mut w))
        }
    }
}
