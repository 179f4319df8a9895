use crate::error::{BluFinanceError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[schemars(description = "Resources held by the hospital: cash, receivables, inventory, fixed assets (Neraca)")]
    Asset,

    #[schemars(description = "Obligations owed to suppliers and staff (Neraca)")]
    Liability,

    #[schemars(description = "Residual interest of the agency (Neraca)")]
    Equity,

    #[schemars(description = "Operating revenue: service fees, grants, APBN/APBD allocations (Laporan Operasional)")]
    Revenue,

    #[schemars(description = "Operating expenses: staff, supplies, services, depreciation (Laporan Operasional)")]
    Expense,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Asset,
        Category::Liability,
        Category::Equity,
        Category::Revenue,
        Category::Expense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Asset => "asset",
            Category::Liability => "liability",
            Category::Equity => "equity",
            Category::Revenue => "revenue",
            Category::Expense => "expense",
        }
    }

    /// Point-in-time categories that belong on the balance sheet.
    pub fn is_balance_sheet(&self) -> bool {
        matches!(self, Category::Asset | Category::Liability | Category::Equity)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = BluFinanceError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| BluFinanceError::MalformedLineItem {
                id: String::new(),
                details: format!("unknown category tag '{}'", s),
            })
    }
}

/// Wire format of a single statement line.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRecord {
    #[schemars(description = "Identifier, unique within its ledger (e.g. '1', 'r1', 'e1')")]
    pub id: String,

    #[schemars(description = "Account name as printed on the statement (e.g. 'Kas dan Setara Kas')")]
    pub name: String,

    #[schemars(description = "Balance or activity for the current reporting period, in rupiah. Must be >= 0.")]
    pub current_value: f64,

    #[schemars(description = "Balance or activity for the previous reporting period, in rupiah. Must be >= 0.")]
    pub previous_value: f64,

    pub category: Category,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Optional grouping label such as 'Lancar', 'Tetap' or 'Jangka Pendek'")]
    pub subcategory: Option<String>,
}

/// An immutable, validated statement line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineItemRecord", into = "LineItemRecord")]
pub struct FinancialLineItem {
    id: String,
    name: String,
    current_value: f64,
    previous_value: f64,
    category: Category,
    subcategory: Option<String>,
}

impl FinancialLineItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        current_value: f64,
        previous_value: f64,
        category: Category,
        subcategory: Option<String>,
    ) -> Result<Self> {
        let id = id.into();
        let name = name.into();

        let malformed = |details: String| BluFinanceError::MalformedLineItem {
            id: id.clone(),
            details,
        };

        if id.trim().is_empty() {
            return Err(malformed("id must not be empty".to_string()));
        }
        if name.trim().is_empty() {
            return Err(malformed("name must not be empty".to_string()));
        }
        for (field, value) in [
            ("currentValue", current_value),
            ("previousValue", previous_value),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(malformed(format!(
                    "{} must be a finite, non-negative amount (got {})",
                    field, value
                )));
            }
        }

        Ok(Self {
            id,
            name,
            current_value,
            previous_value,
            category,
            subcategory: subcategory.filter(|s| !s.trim().is_empty()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn previous_value(&self) -> f64 {
        self.previous_value
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }
}

impl TryFrom<LineItemRecord> for FinancialLineItem {
    type Error = BluFinanceError;

    fn try_from(record: LineItemRecord) -> Result<Self> {
        FinancialLineItem::new(
            record.id,
            record.name,
            record.current_value,
            record.previous_value,
            record.category,
            record.subcategory,
        )
    }
}

impl From<FinancialLineItem> for LineItemRecord {
    fn from(item: FinancialLineItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            current_value: item.current_value,
            previous_value: item.previous_value,
            category: item.category,
            subcategory: item.subcategory,
        }
    }
}

/// Receivable age bands used by the provisioning schedule of
/// KMK No. 1981/MENKES/SK/XII/2010.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
pub enum AgingRange {
    #[serde(rename = "0-6 months")]
    UpToSixMonths,

    #[serde(rename = "6-12 months")]
    SixToTwelveMonths,

    #[serde(rename = "> 12 months")]
    OverTwelveMonths,
}

impl AgingRange {
    pub const ALL: [AgingRange; 3] = [
        AgingRange::UpToSixMonths,
        AgingRange::SixToTwelveMonths,
        AgingRange::OverTwelveMonths,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgingRange::UpToSixMonths => "0-6 months",
            AgingRange::SixToTwelveMonths => "6-12 months",
            AgingRange::OverTwelveMonths => "> 12 months",
        }
    }

    /// Bad-debt reserve rate mandated for this band.
    pub fn regulatory_rate(&self) -> f64 {
        match self {
            AgingRange::UpToSixMonths => 0.0,
            AgingRange::SixToTwelveMonths => 0.5,
            AgingRange::OverTwelveMonths => 1.0,
        }
    }

    pub fn is_overdue(&self) -> bool {
        !matches!(self, AgingRange::UpToSixMonths)
    }
}

impl fmt::Display for AgingRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgingRange {
    type Err = BluFinanceError;

    fn from_str(s: &str) -> Result<Self> {
        AgingRange::ALL
            .into_iter()
            .find(|r| r.label() == s.trim())
            .ok_or_else(|| BluFinanceError::InvalidAgingRange(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgingBucketRecord {
    pub range: AgingRange,

    #[schemars(description = "Outstanding receivables in this age band, in rupiah. Must be >= 0.")]
    pub amount: f64,

    #[schemars(description = "Provision rate in [0, 1]. Must equal the regulatory rate of the band: 0, 0.5 or 1.0.")]
    pub provision_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AgingBucketRecord", into = "AgingBucketRecord")]
pub struct ArAgingBucket {
    range: AgingRange,
    amount: f64,
    provision_rate: f64,
}

impl ArAgingBucket {
    /// Builds a bucket with the regulatory rate of `range`.
    pub fn new(range: AgingRange, amount: f64) -> Result<Self> {
        Self::with_rate(range, amount, range.regulatory_rate())
    }

    pub fn with_rate(range: AgingRange, amount: f64, provision_rate: f64) -> Result<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(BluFinanceError::InvalidAgingAmount {
                range: range.label().to_string(),
                amount,
            });
        }

        let expected = range.regulatory_rate();
        if !(0.0..=1.0).contains(&provision_rate) || provision_rate != expected {
            return Err(BluFinanceError::InvalidProvisionRate {
                range: range.label().to_string(),
                rate: provision_rate,
                expected,
            });
        }

        Ok(Self {
            range,
            amount,
            provision_rate,
        })
    }

    pub fn range(&self) -> AgingRange {
        self.range
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn provision_rate(&self) -> f64 {
        self.provision_rate
    }
}

impl TryFrom<AgingBucketRecord> for ArAgingBucket {
    type Error = BluFinanceError;

    fn try_from(record: AgingBucketRecord) -> Result<Self> {
        ArAgingBucket::with_rate(record.range, record.amount, record.provision_rate)
    }
}

impl From<ArAgingBucket> for AgingBucketRecord {
    fn from(bucket: ArAgingBucket) -> Self {
        Self {
            range: bucket.range,
            amount: bucket.amount,
            provision_rate: bucket.provision_rate,
        }
    }
}

/// Shape of a full statements fixture, used for schema generation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatementsRecord {
    #[schemars(description = "Neraca lines (asset, liability, equity) in presentation order")]
    pub balance_sheet: Vec<LineItemRecord>,

    #[schemars(description = "Laporan Operasional lines (revenue, expense) in presentation order")]
    pub activity: Vec<LineItemRecord>,

    #[schemars(description = "Exactly one bucket per aging range")]
    pub ar_aging: Vec<AgingBucketRecord>,
}

pub fn fixture_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(StatementsRecord)
}

pub fn fixture_schema_as_json() -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&fixture_schema())
}
