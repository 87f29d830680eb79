//! Expense CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_expense_details, format_expense_table};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{ExpenseCategory, Money, PaymentMethod, Taxonomy};
use crate::services::{CreateExpenseInput, ExpenseFilter, ExpenseService};
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record a new expense
    Add {
        /// Vehicle registration number or ID
        vehicle: String,
        /// Gross amount (e.g., "15000" or "15000.50")
        amount: String,
        /// Category (fuel, toll, maintenance, driver salary, insurance,
        /// taxes/gst, permit, other)
        #[arg(short, long, default_value = "fuel")]
        category: String,
        /// Sub-category; defaults to the category's first entry
        #[arg(short, long)]
        sub_category: Option<String>,
        /// Expense date (YYYY-MM-DD); defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Vendor name
        #[arg(short, long)]
        vendor: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// GST amount override; suppresses the suggested rate
        #[arg(long)]
        tax: Option<String>,
        /// Supplier invoice number
        #[arg(short, long)]
        invoice: Option<String>,
        /// Payment method (bank transfer, cash, fastag, credit card, upi)
        #[arg(short, long)]
        payment: Option<String>,
    },
    /// List expenses
    List {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Filter by vehicle registration number or ID
        #[arg(long)]
        vehicle: Option<String>,
        /// Start of date range (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End of date range (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Number of expenses to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show expense details
    Show {
        /// Expense ID
        expense: String,
    },
    /// Delete an expense
    Delete {
        /// Expense ID
        expense: String,
    },
}

pub(super) fn parse_date(s: &str) -> LedgerResult<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| LedgerError::Validation(format!("invalid date '{}': expected YYYY-MM-DD", s)))
}

pub(super) fn parse_money(s: &str) -> LedgerResult<Money> {
    Money::parse(s).map_err(|e| LedgerError::Validation(format!("invalid amount '{}': {}", s, e)))
}

pub(super) fn parse_category(s: &str) -> LedgerResult<ExpenseCategory> {
    s.parse::<ExpenseCategory>()
        .map_err(LedgerError::Validation)
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    taxonomy: &Taxonomy,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> LedgerResult<()> {
    let service = ExpenseService::new(storage, taxonomy);

    match cmd {
        ExpenseCommands::Add {
            vehicle,
            amount,
            category,
            sub_category,
            date,
            vendor,
            description,
            tax,
            invoice,
            payment,
        } => {
            let vehicle = super::resolve_vehicle(storage, &vehicle)?;
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => chrono::Local::now().date_naive(),
            };
            let payment_method = match payment {
                Some(p) => Some(p.parse::<PaymentMethod>().map_err(LedgerError::Validation)?),
                None => Some(settings.default_payment_method),
            };
            let tax_amount = tax.as_deref().map(parse_money).transpose()?;

            let expense = service.create(CreateExpenseInput {
                date,
                amount: parse_money(&amount)?,
                category: parse_category(&category)?,
                sub_category,
                vehicle_id: vehicle.id,
                description,
                vendor,
                tax_amount,
                invoice_number: invoice,
                payment_method,
            })?;

            println!("Recorded expense: {}", expense.id);
            print!("{}", format_expense_details(&expense));
        }

        ExpenseCommands::List {
            category,
            vehicle,
            from,
            to,
            limit,
        } => {
            let mut filter = ExpenseFilter::new();
            if let Some(category) = category {
                filter = filter.category(parse_category(&category)?);
            }
            if let Some(vehicle) = vehicle {
                filter = filter.vehicle(super::resolve_vehicle(storage, &vehicle)?.id);
            }
            if let Some(from) = from {
                filter.start_date = Some(parse_date(&from)?);
            }
            if let Some(to) = to {
                filter.end_date = Some(parse_date(&to)?);
            }
            filter.limit = limit;

            let expenses = service.list(filter)?;
            println!("{}", format_expense_table(&expenses));
        }

        ExpenseCommands::Show { expense } => {
            let id = super::resolve_expense_id(storage, &expense)?;
            let found = service
                .get(id)?
                .ok_or_else(|| LedgerError::expense_not_found(&expense))?;
            print!("{}", format_expense_details(&found));
        }

        ExpenseCommands::Delete { expense } => {
            let id = super::resolve_expense_id(storage, &expense)?;
            let deleted = service.delete(id)?;
            println!("Deleted expense: {} ({})", deleted.id, deleted.amount);
        }
    }

    Ok(())
}
