use anyhow::Result;
use clap::{Parser, Subcommand};

use fleet_ledger::cli::{
    handle_bank_command, handle_dupes_command, handle_expense_command, handle_export_command,
    handle_split_command, handle_vehicle_command, BankCommands, DupesCommands, ExpenseCommands,
    ExportCommands, SplitArgs, VehicleCommands,
};
use fleet_ledger::config::{paths::FleetPaths, settings::Settings};
use fleet_ledger::models::Taxonomy;
use fleet_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "fleetledger",
    version,
    about = "Expense ledger for small vehicle fleets",
    long_about = "fleet-ledger is an expense ledger for small transport operators. \
                  Record fuel, toll and maintenance expenses per vehicle, import \
                  bank statements and reconcile them against the ledger, and keep \
                  GST amounts tracked for filing."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Vehicle management commands
    #[command(subcommand, alias = "veh")]
    Vehicle(VehicleCommands),

    /// Expense management commands
    #[command(subcommand, alias = "exp")]
    Expense(ExpenseCommands),

    /// Bank feed commands
    #[command(subcommand)]
    Bank(BankCommands),

    /// Split a bank transaction into several expenses
    Split(SplitArgs),

    /// Duplicate detection commands
    #[command(subcommand)]
    Dupes(DupesCommands),

    /// Export data
    #[command(subcommand)]
    Export(ExportCommands),

    /// Initialize the ledger data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = FleetPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let taxonomy = Taxonomy::default();

    // Initialize storage
    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Vehicle(cmd)) => {
            handle_vehicle_command(&storage, cmd)?;
        }
        Some(Commands::Expense(cmd)) => {
            handle_expense_command(&storage, &taxonomy, &settings, cmd)?;
        }
        Some(Commands::Bank(cmd)) => {
            handle_bank_command(&storage, &taxonomy, &settings, cmd)?;
        }
        Some(Commands::Split(args)) => {
            handle_split_command(&storage, &taxonomy, &settings, args)?;
        }
        Some(Commands::Dupes(cmd)) => {
            handle_dupes_command(&storage, cmd)?;
        }
        Some(Commands::Export(cmd)) => {
            handle_export_command(&storage, cmd)?;
        }
        Some(Commands::Init) => {
            println!("Initializing fleet-ledger at: {}", paths.data_dir().display());
            storage.save_all()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  fleetledger vehicle add <REG-NUMBER>   register a vehicle");
            println!("  fleetledger expense add ...            record an expense");
            println!("  fleetledger bank import <FILE>         import a bank statement");
        }
        Some(Commands::Config) => {
            println!("fleet-ledger Configuration");
            println!("==========================");
            println!("Data directory: {}", paths.data_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:   {}", settings.currency_symbol);
            println!("  Date format:       {}", settings.date_format);
            println!("  Default GST rate:  {}%", settings.default_gst_rate);
            println!("  Default vehicle:   {}", settings.default_vehicle.as_deref().unwrap_or("(none)"));
            println!("  Show excluded:     {}", settings.show_excluded);
        }
        None => {
            println!("fleet-ledger - Expense ledger for small vehicle fleets");
            println!();
            println!("Run 'fleetledger --help' for usage information.");
            println!("Run 'fleetledger init' to set up the data directory.");
        }
    }

    Ok(())
}
