use crate::error::{BluFinanceError, Result};
use crate::schema::{AgingRange, ArAgingBucket, Category, FinancialLineItem};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Ordered, read-only statement lines for one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FinancialLineItem>", into = "Vec<FinancialLineItem>")]
pub struct Ledger {
    items: Vec<FinancialLineItem>,
}

impl Ledger {
    pub fn new(items: Vec<FinancialLineItem>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(BluFinanceError::DuplicateLineItemId(item.id().to_string()));
            }
        }

        debug!("Ledger constructed with {} line items", items.len());
        Ok(Self { items })
    }

    pub fn items(&self) -> &[FinancialLineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FinancialLineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Items of one category, in ledger order.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &FinancialLineItem> {
        self.items
            .iter()
            .filter(move |item| item.category() == category)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let parts: Vec<FinancialLineItem> = serde_json::from_str(json)?;
        Self::try_from(parts)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses one record per line. Blank lines are skipped.
    pub fn from_json_lines(input: &str) -> Result<Self> {
        let items = input
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<FinancialLineItem>(line))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Self::new(items)
    }

    pub fn to_json_lines(&self) -> Result<String> {
        let mut output = String::new();
        for item in &self.items {
            output.push_str(&serde_json::to_string(item)?);
            output.push('\n');
        }
        Ok(output)
    }
}

impl TryFrom<Vec<FinancialLineItem>> for Ledger {
    type Error = BluFinanceError;

    fn try_from(items: Vec<FinancialLineItem>) -> Result<Self> {
        Ledger::new(items)
    }
}

impl From<Ledger> for Vec<FinancialLineItem> {
    fn from(ledger: Ledger) -> Self {
        ledger.items
    }
}

/// The AR aging buckets, exactly one per range, kept in range order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ArAgingBucket>", into = "Vec<ArAgingBucket>")]
pub struct AgingSchedule {
    buckets: Vec<ArAgingBucket>,
}

impl AgingSchedule {
    pub fn new(mut buckets: Vec<ArAgingBucket>) -> Result<Self> {
        let mut seen = HashSet::new();
        for bucket in &buckets {
            if !seen.insert(bucket.range()) {
                return Err(BluFinanceError::DuplicateAgingBucket(
                    bucket.range().label().to_string(),
                ));
            }
        }

        if let Some(missing) = AgingRange::ALL.iter().find(|range| !seen.contains(*range)) {
            return Err(BluFinanceError::MissingAgingBucket(
                missing.label().to_string(),
            ));
        }

        buckets.sort_by_key(|bucket| bucket.range());
        Ok(Self { buckets })
    }

    /// Builds the schedule from the three outstanding amounts, youngest first.
    pub fn from_amounts(up_to_six: f64, six_to_twelve: f64, over_twelve: f64) -> Result<Self> {
        Self::new(vec![
            ArAgingBucket::new(AgingRange::UpToSixMonths, up_to_six)?,
            ArAgingBucket::new(AgingRange::SixToTwelveMonths, six_to_twelve)?,
            ArAgingBucket::new(AgingRange::OverTwelveMonths, over_twelve)?,
        ])
    }

    pub fn buckets(&self) -> &[ArAgingBucket] {
        &self.buckets
    }

    pub fn bucket(&self, range: AgingRange) -> Option<&ArAgingBucket> {
        self.buckets.iter().find(|bucket| bucket.range() == range)
    }
}

impl TryFrom<Vec<ArAgingBucket>> for AgingSchedule {
    type Error = BluFinanceError;

    fn try_from(buckets: Vec<ArAgingBucket>) -> Result<Self> {
        AgingSchedule::new(buckets)
    }
}

impl From<AgingSchedule> for Vec<ArAgingBucket> {
    fn from(schedule: AgingSchedule) -> Self {
        schedule.buckets
    }
}

/// Everything the dashboard shows for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StatementParts", into = "StatementParts")]
pub struct FinancialStatements {
    balance_sheet: Ledger,
    activity: Ledger,
    ar_aging: AgingSchedule,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementParts {
    balance_sheet: Ledger,
    activity: Ledger,
    ar_aging: AgingSchedule,
}

impl TryFrom<StatementParts> for FinancialStatements {
    type Error = BluFinanceError;

    fn try_from(parts: StatementParts) -> Result<Self> {
        FinancialStatements::new(parts.balance_sheet, parts.activity, parts.ar_aging)
    }
}

impl From<FinancialStatements> for StatementParts {
    fn from(statements: FinancialStatements) -> Self {
        Self {
            balance_sheet: statements.balance_sheet,
            activity: statements.activity,
            ar_aging: statements.ar_aging,
        }
    }
}

impl FinancialStatements {
    pub fn new(balance_sheet: Ledger, activity: Ledger, ar_aging: AgingSchedule) -> Result<Self> {
        if let Some(item) = balance_sheet
            .items()
            .iter()
            .find(|item| !item.category().is_balance_sheet())
        {
            return Err(BluFinanceError::MalformedLineItem {
                id: item.id().to_string(),
                details: format!("category '{}' does not belong on the balance sheet", item.category()),
            });
        }

        if let Some(item) = activity
            .items()
            .iter()
            .find(|item| item.category().is_balance_sheet())
        {
            return Err(BluFinanceError::MalformedLineItem {
                id: item.id().to_string(),
                details: format!("category '{}' does not belong on the activity report", item.category()),
            });
        }

        info!(
            "Financial statements loaded: {} balance sheet lines, {} activity lines",
            balance_sheet.len(),
            activity.len()
        );

        Ok(Self {
            balance_sheet,
            activity,
            ar_aging,
        })
    }

    pub fn balance_sheet(&self) -> &Ledger {
        &self.balance_sheet
    }

    pub fn activity(&self) -> &Ledger {
        &self.activity
    }

    pub fn ar_aging(&self) -> &AgingSchedule {
        &self.ar_aging
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let parts: StatementParts = serde_json::from_str(json)?;
        Self::try_from(parts)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Reading financial statements from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, value: f64, category: Category) -> FinancialLineItem {
        FinancialLineItem::new(id, format!("Account {}", id), value, value, category, None).unwrap()
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let result = Ledger::new(vec![
            item("1", 10.0, Category::Asset),
            item("1", 20.0, Category::Asset),
        ]);
        assert!(matches!(result, Err(BluFinanceError::DuplicateLineItemId(id)) if id == "1"));
    }

    #[test]
    fn test_ledger_preserves_order() {
        let ledger = Ledger::new(vec![
            item("b", 1.0, Category::Asset),
            item("a", 2.0, Category::Liability),
            item("c", 3.0, Category::Asset),
        ])
        .unwrap();

        let ids: Vec<&str> = ledger.by_category(Category::Asset).map(|i| i.id()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(ledger.get("a").unwrap().current_value(), 2.0);
        assert!(ledger.get("z").is_none());
    }

    #[test]
    fn test_json_lines_skips_blank_lines() {
        let input = "{\"id\":\"r1\",\"name\":\"Pendapatan\",\"currentValue\":5,\"previousValue\":4,\"category\":\"revenue\"}\n\n";
        let ledger = Ledger::from_json_lines(input).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.to_json_lines().unwrap().lines().count(), 1);
    }

    #[test]
    fn test_schedule_requires_every_range_once() {
        let missing = AgingSchedule::new(vec![
            ArAgingBucket::new(AgingRange::UpToSixMonths, 1.0).unwrap(),
            ArAgingBucket::new(AgingRange::OverTwelveMonths, 1.0).unwrap(),
        ]);
        assert!(matches!(
            missing,
            Err(BluFinanceError::MissingAgingBucket(range)) if range == "6-12 months"
        ));

        let duplicate = AgingSchedule::new(vec![
            ArAgingBucket::new(AgingRange::UpToSixMonths, 1.0).unwrap(),
            ArAgingBucket::new(AgingRange::UpToSixMonths, 2.0).unwrap(),
            ArAgingBucket::new(AgingRange::SixToTwelveMonths, 1.0).unwrap(),
            ArAgingBucket::new(AgingRange::OverTwelveMonths, 1.0).unwrap(),
        ]);
        assert!(matches!(duplicate, Err(BluFinanceError::DuplicateAgingBucket(_))));
    }

    #[test]
    fn test_schedule_is_sorted_by_range() {
        let schedule = AgingSchedule::new(vec![
            ArAgingBucket::new(AgingRange::OverTwelveMonths, 3.0).unwrap(),
            ArAgingBucket::new(AgingRange::UpToSixMonths, 1.0).unwrap(),
            ArAgingBucket::new(AgingRange::SixToTwelveMonths, 2.0).unwrap(),
        ])
        .unwrap();

        let amounts: Vec<f64> = schedule.buckets().iter().map(|b| b.amount()).collect();
        assert_eq!(amounts, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_statements_reject_misplaced_categories() {
        let balance_sheet = Ledger::new(vec![item("r1", 1.0, Category::Revenue)]).unwrap();
        let activity = Ledger::new(vec![]).unwrap();
        let aging = AgingSchedule::from_amounts(0.0, 0.0, 0.0).unwrap();

        let result = FinancialStatements::new(balance_sheet, activity, aging);
        assert!(matches!(result, Err(BluFinanceError::MalformedLineItem { id, .. }) if id == "r1"));
    }

    #[test]
    fn test_deserializing_statements_checks_categories() {
        let json = r#"{
            "balanceSheet": [
                { "id": "r1", "name": "Pendapatan Hibah", "currentValue": 1, "previousValue": 1, "category": "revenue" }
            ],
            "activity": [],
            "arAging": [
                { "range": "0-6 months", "amount": 0, "provisionRate": 0 },
                { "range": "6-12 months", "amount": 0, "provisionRate": 0.5 },
                { "range": "> 12 months", "amount": 0, "provisionRate": 1 }
            ]
        }"#;

        let result = serde_json::from_str::<FinancialStatements>(json);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("balance sheet"));
        assert!(matches!(
            FinancialStatements::from_json(json),
            Err(BluFinanceError::MalformedLineItem { id, .. }) if id == "r1"
        ));
    }
}
