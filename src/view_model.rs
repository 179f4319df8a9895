use crate::ledger::{FinancialStatements, Ledger};
use crate::metrics::{
    asset_allocation_top, balance_check, category_subtotal, overdue_receivables,
    percent_change, percent_change_between, previous_category_subtotal, provision_amount,
    total_provision, BalanceCheck,
};
use crate::schema::{AgingRange, Category, FinancialLineItem};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Number of slices in the asset allocation chart.
pub const ASSET_ALLOCATION_SLICES: usize = 5;

/// Rupiah tolerance for the assets = liabilities + equity check.
pub const BALANCE_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeTrend {
    Increase,
    Decrease,
    Unchanged,
    Undefined,
}

impl ChangeTrend {
    pub fn from_change(change: Option<f64>) -> Self {
        match change {
            None => ChangeTrend::Undefined,
            Some(c) if c > 0.0 => ChangeTrend::Increase,
            Some(c) if c < 0.0 => ChangeTrend::Decrease,
            Some(_) => ChangeTrend::Unchanged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRow {
    pub id: String,
    pub name: String,
    pub subcategory: Option<String>,
    pub current_value: f64,
    pub previous_value: f64,
    pub change: Option<f64>,
    pub trend: ChangeTrend,
    pub current_label: String,
    pub previous_label: String,
    pub change_label: String,
}

impl LineItemRow {
    fn from_item(item: &FinancialLineItem) -> Self {
        let change = percent_change(item);
        Self {
            id: item.id().to_string(),
            name: item.name().to_string(),
            subcategory: item.subcategory().map(str::to_string),
            current_value: item.current_value(),
            previous_value: item.previous_value(),
            change,
            trend: ChangeTrend::from_change(change),
            current_label: format_idr(item.current_value()),
            previous_label: format_idr(item.previous_value()),
            change_label: format_change(change),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtotalRow {
    pub current_value: f64,
    pub previous_value: f64,
    pub change: Option<f64>,
    pub current_label: String,
    pub change_label: String,
}

impl SubtotalRow {
    fn new(current_value: f64, previous_value: f64) -> Self {
        let change = percent_change_between(current_value, previous_value);
        Self {
            current_value,
            previous_value,
            change,
            current_label: format_idr(current_value),
            change_label: format_change(change),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementSection {
    pub title: String,
    pub rows: Vec<LineItemRow>,
    pub subtotal: SubtotalRow,
}

impl StatementSection {
    fn for_category(title: &str, ledger: &Ledger, category: Category) -> Self {
        Self {
            title: title.to_string(),
            rows: ledger.by_category(category).map(LineItemRow::from_item).collect(),
            subtotal: SubtotalRow::new(
                category_subtotal(ledger.items(), category),
                previous_category_subtotal(ledger.items(), category),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    pub section: StatementSection,
    pub total_revenue: f64,
    pub total_expense: f64,
    /// Revenue minus expense; negative means a deficit.
    pub surplus: f64,
    pub surplus_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingRow {
    pub range: AgingRange,
    pub amount: f64,
    pub provision_rate: f64,
    pub provision: f64,
    pub amount_label: String,
    pub rate_label: String,
    pub provision_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingTable {
    pub rows: Vec<AgingRow>,
    pub total_provision: f64,
    pub total_provision_label: String,
    /// Receivables older than six months.
    pub overdue: f64,
    pub overdue_label: String,
}

/// Display-ready figures for every dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayModel {
    pub balance_sheet: Vec<StatementSection>,
    pub activity: ActivityReport,
    pub performance: Vec<ChartPoint>,
    pub revenue_breakdown: Vec<ChartPoint>,
    pub expense_breakdown: Vec<ChartPoint>,
    pub asset_allocation: Vec<ChartPoint>,
    pub ar_aging: AgingTable,
    pub balance_check: BalanceCheck,
}

pub fn compute_view_model(statements: &FinancialStatements) -> DisplayModel {
    let balance_sheet = vec![
        StatementSection::for_category("Aset (Assets)", statements.balance_sheet(), Category::Asset),
        StatementSection::for_category(
            "Kewajiban (Liabilities)",
            statements.balance_sheet(),
            Category::Liability,
        ),
        StatementSection::for_category("Ekuitas (Equity)", statements.balance_sheet(), Category::Equity),
    ];

    let activity_items = statements.activity().items();
    let total_revenue = category_subtotal(activity_items, Category::Revenue);
    let total_expense = category_subtotal(activity_items, Category::Expense);
    let surplus = total_revenue - total_expense;
    let previous_surplus = previous_category_subtotal(activity_items, Category::Revenue)
        - previous_category_subtotal(activity_items, Category::Expense);

    let activity_section = StatementSection {
        title: "Laporan Operasional (Activity Report)".to_string(),
        rows: activity_items.iter().map(LineItemRow::from_item).collect(),
        subtotal: SubtotalRow::new(surplus, previous_surplus),
    };

    let performance = vec![
        ChartPoint {
            name: "Revenue".to_string(),
            value: total_revenue,
        },
        ChartPoint {
            name: "Expense".to_string(),
            value: total_expense,
        },
    ];

    let breakdown = |category: Category| -> Vec<ChartPoint> {
        statements
            .activity()
            .by_category(category)
            .map(|item| ChartPoint {
                name: short_label(item.name()).to_string(),
                value: item.current_value(),
            })
            .collect()
    };
    let revenue_breakdown = breakdown(Category::Revenue);
    let expense_breakdown = breakdown(Category::Expense);

    let asset_allocation = asset_allocation_top(statements.balance_sheet().items(), ASSET_ALLOCATION_SLICES)
        .into_iter()
        .map(|item| ChartPoint {
            name: item.name().to_string(),
            value: item.current_value(),
        })
        .collect();

    let buckets = statements.ar_aging().buckets();
    let rows = buckets
        .iter()
        .map(|bucket| {
            let provision = provision_amount(bucket);
            AgingRow {
                range: bucket.range(),
                amount: bucket.amount(),
                provision_rate: bucket.provision_rate(),
                provision,
                amount_label: format_idr(bucket.amount()),
                rate_label: format_rate(bucket.provision_rate()),
                provision_label: format_idr(provision),
            }
        })
        .collect();
    let total = total_provision(buckets);
    let overdue = overdue_receivables(buckets);

    let check = balance_check(statements.balance_sheet().items(), BALANCE_TOLERANCE);
    if !check.balanced {
        warn!(
            "Balance sheet does not balance: assets {} vs liabilities + equity {} (difference {})",
            check.total_assets,
            check.total_liabilities + check.total_equity,
            check.difference
        );
    }

    info!(
        "View model computed: revenue {}, expense {}, total provision {}",
        total_revenue, total_expense, total
    );
    debug!("Overdue receivables: {}", overdue);

    DisplayModel {
        balance_sheet,
        activity: ActivityReport {
            section: activity_section,
            total_revenue,
            total_expense,
            surplus,
            surplus_label: format_idr(surplus),
        },
        performance,
        revenue_breakdown,
        expense_breakdown,
        asset_allocation,
        ar_aging: AgingTable {
            rows,
            total_provision: total,
            total_provision_label: format_idr(total),
            overdue,
            overdue_label: format_compact_idr(overdue),
        },
        balance_check: check,
    }
}

impl DisplayModel {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Laporan Keuangan BLU\n\n");

        output.push_str("## Neraca\n\n");
        for section in &self.balance_sheet {
            push_section_markdown(&mut output, section, "Total");
        }

        output.push_str("## Laporan Operasional\n\n");
        push_section_markdown(&mut output, &self.activity.section, "Surplus/Defisit");
        output.push_str(&format!(
            "**Total Revenue:** {}  \n**Total Expense:** {}\n\n",
            format_idr(self.activity.total_revenue),
            format_idr(self.activity.total_expense)
        ));

        output.push_str("## Piutang & Penyisihan (AR Provisioning)\n\n");
        output.push_str("| Aging Category | Amount | Provision Rate | Provision Amount |\n");
        output.push_str("|---|---:|---:|---:|\n");
        for row in &self.ar_aging.rows {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.range, row.amount_label, row.rate_label, row.provision_label
            ));
        }
        output.push_str(&format!(
            "| **Total Provision (Cadangan Kerugian Piutang)** | | | **{}** |\n\n",
            self.ar_aging.total_provision_label
        ));

        output.push_str("## Asset Allocation\n\n");
        for point in &self.asset_allocation {
            output.push_str(&format!("- {}: {}\n", markdown_cell(&point.name), format_idr(point.value)));
        }
        output.push('\n');

        let marker = if self.balance_check.balanced {
            "✅ balanced"
        } else {
            "⚠️ out of balance"
        };
        output.push_str(&format!(
            "**Balance check:** {} (difference {})\n",
            marker,
            format_idr(self.balance_check.difference)
        ));

        output
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Section,Id,Account Name,Subcategory,Current Period,Previous Period,Change (%)\n");

        let sections = self
            .balance_sheet
            .iter()
            .chain(std::iter::once(&self.activity.section));

        for section in sections {
            for row in &section.rows {
                output.push_str(&format!(
                    "{},{},{},{},{:.2},{:.2},{}\n",
                    csv_field(&section.title),
                    csv_field(&row.id),
                    csv_field(&row.name),
                    csv_field(row.subcategory.as_deref().unwrap_or("")),
                    row.current_value,
                    row.previous_value,
                    row.change.map(|c| format!("{:.1}", c)).unwrap_or_default()
                ));
            }
        }

        output
    }
}

fn push_section_markdown(output: &mut String, section: &StatementSection, total_label: &str) {
    output.push_str(&format!("### {}\n\n", section.title));
    output.push_str("| Account Name | Current Period | Previous Period | Change (%) |\n");
    output.push_str("|---|---:|---:|---:|\n");
    for row in &section.rows {
        let name = match &row.subcategory {
            Some(sub) => format!("{} ({})", markdown_cell(&row.name), markdown_cell(sub)),
            None => markdown_cell(&row.name),
        };
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            name, row.current_label, row.previous_label, row.change_label
        ));
    }
    output.push_str(&format!(
        "| **{}** | **{}** | | **{}** |\n\n",
        total_label, section.subtotal.current_label, section.subtotal.change_label
    ));
}

fn markdown_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

/// Chart label: the second word of an account name, or the whole name.
fn short_label(name: &str) -> &str {
    name.split_whitespace().nth(1).unwrap_or(name)
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Rupiah in the `id-ID` style: `Rp 1.500.000.000,00`.
pub fn format_idr(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}Rp {},{:02}", sign, grouped, fraction)
}

/// Short form used on stat cards: `Rp 5.7 M` (miliar) or `Rp 200 jt` (juta).
pub fn format_compact_idr(value: f64) -> String {
    let magnitude = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if magnitude >= 1e9 {
        format!("{}Rp {:.1} M", sign, magnitude / 1e9)
    } else if magnitude >= 1e6 {
        format!("{}Rp {:.0} jt", sign, magnitude / 1e6)
    } else {
        format_idr(value)
    }
}

/// One decimal place, explicit `+` on growth, `n/a` when undefined.
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(c) if c > 0.0 => format!("+{:.1}%", c),
        Some(c) => format!("{:.1}%", c),
        None => "n/a".to_string(),
    }
}

pub fn format_rate(rate: f64) -> String {
    format!("{}%", rate * 100.0)
}
