use blu_finance_core::*;
use std::error::Error;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let statements = match std::env::args().nth(1) {
        Some(path) => FinancialStatements::load(std::path::Path::new(&path))?,
        None => fixtures::reference_statements()?,
    };

    let view = compute_view_model(&statements);

    println!("{}", view.to_markdown());

    println!("📊 Revenue vs Expense");
    for point in &view.performance {
        println!(
            "   {:<8} {}",
            point.name,
            view_model::format_compact_idr(point.value)
        );
    }

    println!("\n🧾 AR Aging > 6mo: {}", view.ar_aging.overdue_label);

    if !view.balance_check.balanced {
        println!(
            "⚠️  Assets exceed liabilities + equity by {}",
            view_model::format_idr(view.balance_check.difference)
        );
    }

    Ok(())
}
