//! Bank feed CSV import
//!
//! Imports bank statement CSVs into pending bank transactions: column
//! mapping, date parsing with fallback formats, duplicate detection against
//! previously imported lines, and a preview/commit flow. Bad rows and
//! duplicates never abort the batch.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use csv::{Reader, StringRecord};

use crate::audit::{AuditEntry, EntityType};
use crate::error::LedgerResult;
use crate::models::{BankTransaction, Money};
use crate::storage::Storage;

/// Column mapping configuration for feed CSVs
#[derive(Debug, Clone)]
pub struct FeedMapping {
    /// Index of the date column
    pub date_column: usize,
    /// Index of the debit amount column
    pub amount_column: usize,
    /// Index of the narration/description column
    pub description_column: usize,
    /// Date format string (e.g., "%Y-%m-%d", "%d/%m/%Y")
    pub date_format: String,
    /// Whether the first row is a header
    pub has_header: bool,
    /// Delimiter character
    pub delimiter: char,
}

impl Default for FeedMapping {
    fn default() -> Self {
        Self {
            date_column: 0,
            amount_column: 2,
            description_column: 1,
            date_format: "%Y-%m-%d".to_string(),
            has_header: true,
            delimiter: ',',
        }
    }
}

impl FeedMapping {
    /// Create a new feed mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the date format
    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }

    /// Set whether the first row is a header
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set the delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// A parsed feed row before import
#[derive(Debug, Clone)]
pub struct ParsedFeedLine {
    /// Value date of the debit
    pub date: NaiveDate,
    /// Debit amount
    pub amount: Money,
    /// Statement narration
    pub description: String,
    /// Original row number in the CSV (0-indexed, excluding header)
    pub row_number: usize,
    /// Generated import ID for duplicate detection
    pub import_id: String,
}

impl ParsedFeedLine {
    /// Generate an import ID from the line data
    pub fn generate_import_id(date: NaiveDate, amount: Money, description: &str) -> String {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        date.hash(&mut hasher);
        amount.paise().hash(&mut hasher);
        description.trim().to_lowercase().hash(&mut hasher);
        format!("imp-{:016x}", hasher.finish())
    }
}

/// Status of a feed line in the import preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
    /// Line will be imported
    New,
    /// Line was already imported and will be skipped
    Duplicate,
    /// Line could not be parsed
    Error(String),
}

/// Preview entry for import review
#[derive(Debug, Clone)]
pub struct ImportPreviewEntry {
    /// The parsed line, when parsing succeeded
    pub line: Option<ParsedFeedLine>,
    /// Import status
    pub status: ImportStatus,
}

/// Result of a completed import
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    /// Number of transactions imported
    pub imported: usize,
    /// Number of duplicates skipped
    pub duplicates_skipped: usize,
    /// Number of rows with errors
    pub errors: usize,
    /// IDs of imported transactions
    pub imported_ids: Vec<String>,
    /// Error messages by row
    pub error_messages: HashMap<usize, String>,
}

/// Service for bank feed import
pub struct ImportService<'a> {
    storage: &'a Storage,
}

impl<'a> ImportService<'a> {
    /// Create a new import service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Parse a CSV from a reader into feed lines
    pub fn parse_csv_from_reader<R: std::io::Read>(
        &self,
        reader: &mut Reader<R>,
        mapping: &FeedMapping,
    ) -> LedgerResult<Vec<Result<ParsedFeedLine, String>>> {
        let mut results = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    results.push(Err(format!("error reading CSV record: {}", e)));
                    continue;
                }
            };
            results.push(self.parse_record(&record, idx, mapping));
        }
        Ok(results)
    }

    /// Parse a single CSV record
    fn parse_record(
        &self,
        record: &StringRecord,
        row_number: usize,
        mapping: &FeedMapping,
    ) -> Result<ParsedFeedLine, String> {
        let date_str = record
            .get(mapping.date_column)
            .ok_or_else(|| "missing date column".to_string())?
            .trim();
        let date = parse_date(date_str, &mapping.date_format)?;

        let amount_str = record
            .get(mapping.amount_column)
            .ok_or_else(|| "missing amount column".to_string())?
            .trim();
        let amount = parse_amount(amount_str)?;
        if !amount.is_positive() {
            return Err(format!("debit amount must be positive, got {}", amount));
        }

        let description = record
            .get(mapping.description_column)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if description.is_empty() {
            return Err("missing description".to_string());
        }

        let import_id = ParsedFeedLine::generate_import_id(date, amount, &description);

        Ok(ParsedFeedLine {
            date,
            amount,
            description,
            row_number,
            import_id,
        })
    }

    /// Generate an import preview, checking for duplicates against both the
    /// stored feed and earlier lines of the same batch
    pub fn generate_preview(
        &self,
        parsed: &[Result<ParsedFeedLine, String>],
    ) -> LedgerResult<Vec<ImportPreviewEntry>> {
        let existing: HashSet<String> = self
            .storage
            .bank_txns
            .get_all()?
            .into_iter()
            .filter_map(|t| t.import_id)
            .collect();

        let mut seen_in_batch: HashSet<String> = HashSet::new();
        let mut preview = Vec::with_capacity(parsed.len());

        for result in parsed {
            match result {
                Ok(line) => {
                    let is_dup = existing.contains(&line.import_id)
                        || !seen_in_batch.insert(line.import_id.clone());
                    preview.push(ImportPreviewEntry {
                        line: Some(line.clone()),
                        status: if is_dup {
                            ImportStatus::Duplicate
                        } else {
                            ImportStatus::New
                        },
                    });
                }
                Err(e) => preview.push(ImportPreviewEntry {
                    line: None,
                    status: ImportStatus::Error(e.clone()),
                }),
            }
        }

        Ok(preview)
    }

    /// Import the `New` entries of a preview as pending bank transactions
    pub fn import_from_preview(
        &self,
        preview: &[ImportPreviewEntry],
    ) -> LedgerResult<ImportResult> {
        let mut result = ImportResult::default();
        let mut audit_entries = Vec::new();

        for entry in preview {
            match (&entry.status, &entry.line) {
                (ImportStatus::New, Some(line)) => {
                    let mut txn =
                        BankTransaction::new(line.date, line.amount, line.description.clone());
                    txn.import_id = Some(line.import_id.clone());

                    self.storage.bank_txns.upsert(txn.clone())?;
                    audit_entries.push(AuditEntry::create(
                        EntityType::BankTransaction,
                        txn.id.to_string(),
                        Some(txn.description.clone()),
                        &txn,
                    ));
                    result.imported += 1;
                    result.imported_ids.push(txn.id.to_string());
                }
                (ImportStatus::Duplicate, _) => result.duplicates_skipped += 1,
                (ImportStatus::Error(msg), line) => {
                    result.errors += 1;
                    let row = line.as_ref().map(|l| l.row_number).unwrap_or(0);
                    result.error_messages.insert(row, msg.clone());
                }
                // New without a line cannot be produced by generate_preview
                (ImportStatus::New, None) => {
                    result.errors += 1;
                }
            }
        }

        if result.imported > 0 {
            self.storage.bank_txns.save()?;
        }
        self.storage.audit().log_batch(&audit_entries)?;

        Ok(result)
    }

    /// Parse and import a CSV file in one step
    pub fn import_file(
        &self,
        path: &std::path::Path,
        mapping: &FeedMapping,
    ) -> LedgerResult<ImportResult> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(mapping.has_header)
            .delimiter(mapping.delimiter as u8)
            .flexible(true)
            .from_path(path)
            .map_err(|e| crate::error::LedgerError::Import(format!("{}", e)))?;

        let parsed = self.parse_csv_from_reader(&mut reader, mapping)?;
        let preview = self.generate_preview(&parsed)?;
        self.import_from_preview(&preview)
    }
}

/// Parse a date string, trying the primary format then common alternatives
fn parse_date(s: &str, primary_format: &str) -> Result<NaiveDate, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, primary_format) {
        return Ok(date);
    }

    let formats = [
        "%Y-%m-%d", "%d/%m/%Y", "%d/%m/%y", "%d-%m-%Y", "%m/%d/%Y", "%Y/%m/%d",
    ];
    for format in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Ok(date);
        }
    }

    Err(format!("could not parse date: '{}'", s))
}

/// Parse an amount string, handling currency symbols, commas, and the
/// accounting parentheses-negative convention
fn parse_amount(s: &str) -> Result<Money, String> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-' || *c == '(' || *c == ')')
        .collect();

    let (is_negative, value) = if cleaned.starts_with('(') && cleaned.ends_with(')') {
        (true, &cleaned[1..cleaned.len() - 1])
    } else if let Some(stripped) = cleaned.strip_prefix('-') {
        (true, stripped)
    } else {
        (false, cleaned.as_str())
    };

    Money::parse(value)
        .map(|m| if is_negative { -m } else { m })
        .map_err(|e| format!("could not parse amount '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FleetPaths;
    use tempfile::TempDir;

    const FEED: &str = "\
Date,Description,Amount
2024-05-17,IOCL PETROL PUMP,\"5,000.00\"
2024-05-18,FASTAG RECHARGE - ICICI,450.00
2024-05-17,IOCL PETROL PUMP,\"5,000.00\"
bad-date,SOMETHING,100.00
";

    fn setup() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FleetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn parse(storage: &Storage, csv_text: &str) -> Vec<Result<ParsedFeedLine, String>> {
        let service = ImportService::new(storage);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_text.as_bytes());
        service
            .parse_csv_from_reader(&mut reader, &FeedMapping::default())
            .unwrap()
    }

    #[test]
    fn test_parse_rows() {
        let (_tmp, storage) = setup();
        let parsed = parse(&storage, FEED);

        assert_eq!(parsed.len(), 4);
        let first = parsed[0].as_ref().unwrap();
        assert_eq!(first.amount, Money::from_rupees(5000));
        assert_eq!(first.description, "IOCL PETROL PUMP");
        assert!(parsed[3].is_err());
    }

    #[test]
    fn test_preview_flags_in_batch_duplicate() {
        let (_tmp, storage) = setup();
        let service = ImportService::new(&storage);
        let parsed = parse(&storage, FEED);
        let preview = service.generate_preview(&parsed).unwrap();

        assert_eq!(preview[0].status, ImportStatus::New);
        assert_eq!(preview[1].status, ImportStatus::New);
        // Same date, amount, description as row 0
        assert_eq!(preview[2].status, ImportStatus::Duplicate);
        assert!(matches!(preview[3].status, ImportStatus::Error(_)));
    }

    #[test]
    fn test_import_and_reimport() {
        let (_tmp, storage) = setup();
        let service = ImportService::new(&storage);

        let parsed = parse(&storage, FEED);
        let preview = service.generate_preview(&parsed).unwrap();
        let result = service.import_from_preview(&preview).unwrap();

        assert_eq!(result.imported, 2);
        assert_eq!(result.duplicates_skipped, 1);
        assert_eq!(result.errors, 1);
        assert_eq!(storage.bank_txns.count().unwrap(), 2);
        // One audit line per imported transaction
        assert_eq!(storage.audit().read_all().unwrap().len(), 2);

        // Importing the same statement again skips everything
        let parsed = parse(&storage, FEED);
        let preview = service.generate_preview(&parsed).unwrap();
        let result = service.import_from_preview(&preview).unwrap();
        assert_eq!(result.imported, 0);
        assert_eq!(result.duplicates_skipped, 3);
        assert_eq!(storage.bank_txns.count().unwrap(), 2);
    }

    #[test]
    fn test_import_file() {
        let (tmp, storage) = setup();
        let service = ImportService::new(&storage);

        let csv_path = tmp.path().join("feed.csv");
        std::fs::write(&csv_path, FEED).unwrap();

        let result = service
            .import_file(&csv_path, &FeedMapping::default())
            .unwrap();
        assert_eq!(result.imported, 2);
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("₹5,000.00").unwrap(), Money::from_rupees(5000));
        assert_eq!(parse_amount("(450.00)").unwrap(), -Money::from_rupees(450));
        assert_eq!(parse_amount("-12.50").unwrap(), Money::from_paise(-1250));
        assert!(parse_amount("n/a").is_err());
    }

    #[test]
    fn test_parse_date_fallback_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(parse_date("2024-05-17", "%Y-%m-%d").unwrap(), expected);
        assert_eq!(parse_date("17/05/2024", "%Y-%m-%d").unwrap(), expected);
        assert!(parse_date("yesterday", "%Y-%m-%d").is_err());
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        let (_tmp, storage) = setup();
        let csv_text = "Date,Description,Amount\n2024-05-17,REFUND,-100.00\n";
        let parsed = parse(&storage, csv_text);
        assert!(parsed[0].is_err());
    }
}
