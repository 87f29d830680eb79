//! Expense category taxonomy and GST rate table
//!
//! The taxonomy maps each category to its allowed sub-categories and the GST
//! rate suggestions for them. It is built once at startup from static domain
//! data and validated for completeness, rather than living as nested literals
//! scattered through the UI layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The fixed GST slab set. Suggested rates always come from this set;
/// a manual override may also zero the rate out.
pub const GST_SLABS: [u8; 5] = [0, 5, 12, 18, 28];

/// Rate suggested when a category/sub-category combination is unrecognized.
pub const DEFAULT_GST_RATE: u8 = 18;

/// Fixed set of fleet expense categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Fuel,
    Toll,
    Maintenance,
    #[serde(rename = "Driver Salary")]
    DriverSalary,
    Insurance,
    #[serde(rename = "Taxes/GST")]
    TaxesGst,
    Permit,
    Other,
}

impl ExpenseCategory {
    /// All categories in display order
    pub fn all() -> &'static [Self] {
        &[
            Self::Fuel,
            Self::Toll,
            Self::Maintenance,
            Self::DriverSalary,
            Self::Insurance,
            Self::TaxesGst,
            Self::Permit,
            Self::Other,
        ]
    }

    /// Human-readable name matching the serialized form
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fuel => "Fuel",
            Self::Toll => "Toll",
            Self::Maintenance => "Maintenance",
            Self::DriverSalary => "Driver Salary",
            Self::Insurance => "Insurance",
            Self::TaxesGst => "Taxes/GST",
            Self::Permit => "Permit",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::all()
            .iter()
            .find(|c| c.name().to_lowercase() == normalized)
            .copied()
            .ok_or_else(|| format!("unknown expense category: {}", s))
    }
}

/// Definition of one category: allowed sub-categories and rate suggestions
#[derive(Debug, Clone)]
pub struct CategoryDef {
    /// Allowed sub-category names, in display order
    pub sub_categories: Vec<&'static str>,
    /// Rate suggested for sub-categories without a specific override
    pub default_rate: u8,
    /// Sub-category specific rate overrides
    pub rate_overrides: HashMap<&'static str, u8>,
}

impl CategoryDef {
    fn new(subs: &[&'static str], default_rate: u8, overrides: &[(&'static str, u8)]) -> Self {
        Self {
            sub_categories: subs.to_vec(),
            default_rate,
            rate_overrides: overrides.iter().copied().collect(),
        }
    }

    /// Whether a sub-category name belongs to this category
    pub fn contains(&self, sub_category: &str) -> bool {
        self.sub_categories.iter().any(|s| *s == sub_category)
    }

    /// Suggested rate for a sub-category of this category
    pub fn rate_for(&self, sub_category: &str) -> u8 {
        self.rate_overrides
            .get(sub_category)
            .copied()
            .unwrap_or(self.default_rate)
    }
}

/// Typed lookup structure over the whole category/sub-category/rate domain
#[derive(Debug, Clone)]
pub struct Taxonomy {
    defs: HashMap<ExpenseCategory, CategoryDef>,
}

impl Taxonomy {
    /// Build the standard fleet taxonomy.
    ///
    /// Rates: diesel and other plain fuel purchases carry no creditable GST,
    /// AdBlue is a standard-rated consumable; Fastag tolls are exempt while
    /// cash tolls bill 12% and parking 18%; tire replacement sits in the 28%
    /// slab; salaries and permits are outside GST entirely.
    pub fn standard() -> Self {
        use ExpenseCategory::*;

        let mut defs = HashMap::new();
        defs.insert(
            Fuel,
            CategoryDef::new(&["Diesel", "AdBlue", "CNG", "Other"], 0, &[("AdBlue", 18)]),
        );
        defs.insert(
            Toll,
            CategoryDef::new(
                &["Fastag", "Cash Toll", "Parking", "Other"],
                12,
                &[("Fastag", 0), ("Parking", 18)],
            ),
        );
        defs.insert(
            Maintenance,
            CategoryDef::new(
                &[
                    "Engine Repair",
                    "Tire Replacement",
                    "Oil Change",
                    "Brake Service",
                    "Body Work",
                    "Electrical",
                    "Regular Service",
                    "Other",
                ],
                18,
                &[("Tire Replacement", 28)],
            ),
        );
        defs.insert(
            DriverSalary,
            CategoryDef::new(
                &["Monthly", "Bonus", "Advance", "Allowance (Batta)", "Other"],
                0,
                &[],
            ),
        );
        defs.insert(
            Insurance,
            CategoryDef::new(
                &["Renewal", "Third Party", "Comprehensive", "Claim Payment", "Other"],
                18,
                &[],
            ),
        );
        defs.insert(
            TaxesGst,
            CategoryDef::new(
                &["RTO Tax", "Professional Tax", "Filing Fees", "Other"],
                18,
                &[],
            ),
        );
        defs.insert(
            Permit,
            CategoryDef::new(
                &[
                    "National Permit",
                    "State Permit",
                    "Fitness",
                    "Pollution (PUC)",
                    "Other",
                ],
                0,
                &[],
            ),
        );
        defs.insert(
            Other,
            CategoryDef::new(&["Misc", "Emergency", "Loan EMI", "Other"], 18, &[]),
        );

        Self { defs }
    }

    /// Get the definition for a category
    pub fn def(&self, category: ExpenseCategory) -> Option<&CategoryDef> {
        self.defs.get(&category)
    }

    /// Whether a sub-category belongs to a category's allowed set
    pub fn is_valid_sub_category(&self, category: ExpenseCategory, sub_category: &str) -> bool {
        self.defs
            .get(&category)
            .map(|d| d.contains(sub_category))
            .unwrap_or(false)
    }

    /// First sub-category of a category (used for defaulting)
    pub fn default_sub_category(&self, category: ExpenseCategory) -> &'static str {
        self.defs
            .get(&category)
            .and_then(|d| d.sub_categories.first().copied())
            .unwrap_or("Other")
    }

    /// Validate taxonomy completeness: every category defined, every
    /// sub-category list non-empty and closed with "Other", every rate a
    /// standard slab.
    pub fn validate(&self) -> Result<(), TaxonomyValidationError> {
        for category in ExpenseCategory::all() {
            let def = self
                .defs
                .get(category)
                .ok_or(TaxonomyValidationError::MissingCategory(*category))?;

            if def.sub_categories.is_empty() {
                return Err(TaxonomyValidationError::NoSubCategories(*category));
            }

            if !def.contains("Other") {
                return Err(TaxonomyValidationError::NoFallbackSubCategory(*category));
            }

            if !GST_SLABS.contains(&def.default_rate) {
                return Err(TaxonomyValidationError::NonSlabRate(
                    *category,
                    def.default_rate,
                ));
            }
            for rate in def.rate_overrides.values() {
                if !GST_SLABS.contains(rate) {
                    return Err(TaxonomyValidationError::NonSlabRate(*category, *rate));
                }
            }
        }
        Ok(())
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Validation errors for the taxonomy table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyValidationError {
    MissingCategory(ExpenseCategory),
    NoSubCategories(ExpenseCategory),
    NoFallbackSubCategory(ExpenseCategory),
    NonSlabRate(ExpenseCategory, u8),
}

impl fmt::Display for TaxonomyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCategory(c) => write!(f, "category {} has no definition", c),
            Self::NoSubCategories(c) => write!(f, "category {} has no sub-categories", c),
            Self::NoFallbackSubCategory(c) => {
                write!(f, "category {} is missing the 'Other' sub-category", c)
            }
            Self::NonSlabRate(c, r) => {
                write!(f, "category {} suggests non-slab GST rate {}%", c, r)
            }
        }
    }
}

impl std::error::Error for TaxonomyValidationError {}
