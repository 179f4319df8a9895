//! Derived figures for the dashboard: period-over-period change, category
//! subtotals, AR provisioning and the asset allocation slice.
//!
//! Every function here is pure and only reads already-validated data.

use crate::schema::{ArAgingBucket, Category, FinancialLineItem};
use serde::{Deserialize, Serialize};

/// Neumaier-compensated sum.
pub fn stable_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;

    for value in values {
        let t = sum + value;
        if sum.abs() >= value.abs() {
            compensation += (sum - t) + value;
        } else {
            compensation += (value - t) + sum;
        }
        sum = t;
    }

    sum + compensation
}

/// Period-over-period change in percent.
///
/// Returns `None` when the previous value is zero, so the change is undefined
/// rather than infinite or NaN.
pub fn percent_change(item: &FinancialLineItem) -> Option<f64> {
    percent_change_between(item.current_value(), item.previous_value())
}

/// Change relative to the size of `previous`, so a signed figure such as a
/// surplus moving out of a deficit still reads as growth.
pub fn percent_change_between(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }

    let change = (current - previous) / previous.abs() * 100.0;
    change.is_finite().then_some(change)
}

pub fn category_subtotal(items: &[FinancialLineItem], category: Category) -> f64 {
    stable_sum(
        items
            .iter()
            .filter(|item| item.category() == category)
            .map(|item| item.current_value()),
    )
}

pub fn previous_category_subtotal(items: &[FinancialLineItem], category: Category) -> f64 {
    stable_sum(
        items
            .iter()
            .filter(|item| item.category() == category)
            .map(|item| item.previous_value()),
    )
}

pub fn provision_amount(bucket: &ArAgingBucket) -> f64 {
    bucket.amount() * bucket.provision_rate()
}

pub fn total_provision(buckets: &[ArAgingBucket]) -> f64 {
    stable_sum(buckets.iter().map(provision_amount))
}

/// Receivables older than six months.
pub fn overdue_receivables(buckets: &[ArAgingBucket]) -> f64 {
    stable_sum(
        buckets
            .iter()
            .filter(|bucket| bucket.range().is_overdue())
            .map(|bucket| bucket.amount()),
    )
}

/// The first `n` asset items in ledger order.
///
/// This is an insertion-order slice, not a top-N by value: a large asset listed
/// late in the ledger is left out.
pub fn asset_allocation_top(items: &[FinancialLineItem], n: usize) -> Vec<&FinancialLineItem> {
    items
        .iter()
        .filter(|item| item.category() == Category::Asset)
        .take(n)
        .collect()
}

/// Single-step surplus (deficit when negative): revenue minus expense.
pub fn operating_surplus(items: &[FinancialLineItem]) -> f64 {
    category_subtotal(items, Category::Revenue) - category_subtotal(items, Category::Expense)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceCheck {
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub total_equity: f64,
    /// Assets minus (liabilities + equity).
    pub difference: f64,
    pub balanced: bool,
}

/// Compares assets with liabilities plus equity.
pub fn balance_check(items: &[FinancialLineItem], tolerance: f64) -> BalanceCheck {
    let total_assets = category_subtotal(items, Category::Asset);
    let total_liabilities = category_subtotal(items, Category::Liability);
    let total_equity = category_subtotal(items, Category::Equity);
    let difference = total_assets - (total_liabilities + total_equity);

    BalanceCheck {
        total_assets,
        total_liabilities,
        total_equity,
        difference,
        balanced: difference.abs() <= tolerance,
    }
}
