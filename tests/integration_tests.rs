use blu_finance_core::clinical::find_patient;
use blu_finance_core::view_model::{format_idr, ChangeTrend};
use blu_finance_core::*;

fn fixture_ledger(values: &[(&str, f64, Category)]) -> Ledger {
    Ledger::new(
        values
            .iter()
            .map(|(id, value, category)| {
                FinancialLineItem::new(*id, format!("Account {}", id), *value, *value, *category, None)
                    .unwrap()
            })
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_reference_balance_sheet_totals() {
    let statements = fixtures::reference_statements().unwrap();
    let items = statements.balance_sheet().items();

    assert_eq!(category_subtotal(items, Category::Asset), 20_200_000_000.0);
    assert_eq!(category_subtotal(items, Category::Liability), 450_000_000.0);
    assert_eq!(category_subtotal(items, Category::Equity), 19_000_000_000.0);
    assert_eq!(
        previous_category_subtotal(items, Category::Asset),
        19_370_000_000.0
    );
}

#[test]
fn test_scenario_asset_list_sums_to_twenty_point_two_billion() {
    let ledger = fixture_ledger(&[
        ("1", 1_500_000_000.0, Category::Asset),
        ("2", 500_000_000.0, Category::Asset),
        ("3", 800_000_000.0, Category::Asset),
        ("4", 400_000_000.0, Category::Asset),
        ("5", 12_000_000_000.0, Category::Asset),
        ("6", 5_000_000_000.0, Category::Asset),
    ]);

    assert_eq!(
        category_subtotal(ledger.items(), Category::Asset),
        20_200_000_000.0
    );
}

#[test]
fn test_reference_provisioning() {
    let statements = fixtures::reference_statements().unwrap();
    let buckets = statements.ar_aging().buckets();

    assert_eq!(total_provision(buckets), 125_000_000.0);
    assert_eq!(overdue_receivables(buckets), 200_000_000.0);

    let expected: f64 = buckets
        .iter()
        .map(|b| b.amount() * b.provision_rate())
        .sum();
    assert_eq!(total_provision(buckets), expected);
}

#[test]
fn test_view_model_for_reference_statements() {
    let statements = fixtures::reference_statements().unwrap();
    let view = compute_view_model(&statements);

    let titles: Vec<&str> = view.balance_sheet.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Aset (Assets)", "Kewajiban (Liabilities)", "Ekuitas (Equity)"]
    );

    let assets = &view.balance_sheet[0];
    assert_eq!(assets.rows.len(), 6);
    assert_eq!(assets.rows[0].change_label, "+25.0%");
    assert_eq!(assets.rows[0].current_label, "Rp 1.500.000.000,00");
    assert_eq!(assets.rows[3].change_label, "-4.8%");
    assert_eq!(assets.rows[3].trend, ChangeTrend::Decrease);
    assert_eq!(assets.subtotal.current_value, 20_200_000_000.0);

    assert_eq!(view.activity.total_revenue, 5_700_000_000.0);
    assert_eq!(view.activity.total_expense, 4_100_000_000.0);
    assert_eq!(view.activity.surplus, 1_600_000_000.0);
    assert_eq!(view.activity.section.rows.len(), 7);

    let flat = view
        .activity
        .section
        .rows
        .iter()
        .find(|r| r.id == "r3")
        .unwrap();
    assert_eq!(flat.change_label, "0.0%");
    assert_eq!(flat.trend, ChangeTrend::Unchanged);

    assert_eq!(view.performance[0].value, 5_700_000_000.0);
    assert_eq!(view.performance[1].value, 4_100_000_000.0);

    let revenue_labels: Vec<&str> = view.revenue_breakdown.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(revenue_labels, vec!["Jasa", "Hibah", "APBN/APBD"]);
    let expense_labels: Vec<&str> = view.expense_breakdown.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(expense_labels, vec!["Pegawai", "Persediaan", "Jasa", "Penyusutan"]);
    assert_eq!(view.expense_breakdown[0].value, 2_100_000_000.0);

    let provisions: Vec<f64> = view.ar_aging.rows.iter().map(|r| r.provision).collect();
    assert_eq!(provisions, vec![0.0, 75_000_000.0, 50_000_000.0]);
    let rates: Vec<&str> = view.ar_aging.rows.iter().map(|r| r.rate_label.as_str()).collect();
    assert_eq!(rates, vec!["0%", "50%", "100%"]);
    assert_eq!(view.ar_aging.total_provision_label, "Rp 125.000.000,00");
    assert_eq!(view.ar_aging.overdue_label, "Rp 200 jt");

    assert!(!view.balance_check.balanced);
    assert_eq!(view.balance_check.difference, 750_000_000.0);
}

#[test]
fn test_asset_allocation_is_insertion_order_slice() {
    let statements = fixtures::reference_statements().unwrap();
    let view = compute_view_model(&statements);

    let names: Vec<&str> = view.asset_allocation.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Kas dan Setara Kas",
            "Investasi Jangka Pendek (3-12 bln)",
            "Piutang Pelayanan",
            "Persediaan",
            "Aset Tetap (Tanah & Bangunan)",
        ]
    );
    // Peralatan Medis is the second largest asset but sits sixth in the ledger.
    assert!(!names.contains(&"Peralatan Medis"));

    let ledger = fixture_ledger(&[
        ("a", 1.0, Category::Asset),
        ("b", 900.0, Category::Asset),
        ("c", 5.0, Category::Asset),
        ("d", 70.0, Category::Asset),
        ("e", 2.0, Category::Asset),
        ("f", 10_000.0, Category::Asset),
    ]);
    let ids: Vec<&str> = asset_allocation_top(ledger.items(), 5)
        .iter()
        .map(|i| i.id())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn test_zero_previous_value_renders_as_undefined() {
    let balance_sheet = Ledger::new(vec![FinancialLineItem::new(
        "new",
        "Piutang BPJS",
        10_000.0,
        0.0,
        Category::Asset,
        Some("Lancar".to_string()),
    )
    .unwrap()])
    .unwrap();
    let activity = Ledger::new(vec![]).unwrap();
    let aging = AgingSchedule::from_amounts(0.0, 0.0, 0.0).unwrap();
    let statements = FinancialStatements::new(balance_sheet, activity, aging).unwrap();

    let view = compute_view_model(&statements);
    let row = &view.balance_sheet[0].rows[0];
    assert_eq!(row.change, None);
    assert_eq!(row.change_label, "n/a");
    assert_eq!(row.trend, ChangeTrend::Undefined);

    let json = view.to_json().unwrap();
    assert!(!json.contains("NaN"));
    assert!(!json.contains("inf"));
    assert!(!view.to_markdown().contains("NaN"));

    // Empty activity report: surplus of zero over zero is undefined too.
    assert_eq!(view.activity.section.subtotal.change_label, "n/a");
}

#[test]
fn test_surplus_recovering_from_deficit_is_an_increase() {
    let activity = Ledger::new(vec![
        FinancialLineItem::new("r1", "Pendapatan Jasa", 300.0, 100.0, Category::Revenue, None).unwrap(),
        FinancialLineItem::new("e1", "Beban Pegawai", 200.0, 200.0, Category::Expense, None).unwrap(),
    ])
    .unwrap();
    let statements = FinancialStatements::new(
        Ledger::new(vec![]).unwrap(),
        activity,
        AgingSchedule::from_amounts(0.0, 0.0, 0.0).unwrap(),
    )
    .unwrap();

    let view = compute_view_model(&statements);
    let surplus = &view.activity.section.subtotal;
    assert_eq!(surplus.previous_value, -100.0);
    assert_eq!(surplus.current_value, 100.0);
    assert_eq!(surplus.change, Some(200.0));
    assert_eq!(surplus.change_label, "+200.0%");
}

#[test]
fn test_markdown_escapes_pipes_in_account_names() {
    let balance_sheet = Ledger::new(vec![FinancialLineItem::new(
        "1",
        "Kas | Bank",
        10.0,
        10.0,
        Category::Asset,
        Some("Lancar".to_string()),
    )
    .unwrap()])
    .unwrap();
    let statements = FinancialStatements::new(
        balance_sheet,
        Ledger::new(vec![]).unwrap(),
        AgingSchedule::from_amounts(0.0, 0.0, 0.0).unwrap(),
    )
    .unwrap();

    let markdown = compute_view_model(&statements).to_markdown();
    let row = markdown
        .lines()
        .find(|line| line.contains("Kas"))
        .unwrap();
    assert!(row.starts_with("| Kas \\| Bank (Lancar) |"));
    assert_eq!(row.matches(" | ").count(), 3);
}

#[test]
fn test_json_round_trip_preserves_subtotals() -> anyhow::Result<()> {
    let statements = fixtures::reference_statements()?;
    let json = statements.to_json()?;
    let reloaded = FinancialStatements::from_json(&json)?;

    assert_eq!(reloaded, statements);
    for category in Category::ALL {
        assert_eq!(
            category_subtotal(reloaded.balance_sheet().items(), category),
            category_subtotal(statements.balance_sheet().items(), category)
        );
        assert_eq!(
            category_subtotal(reloaded.activity().items(), category),
            category_subtotal(statements.activity().items(), category)
        );
    }
    assert_eq!(
        total_provision(reloaded.ar_aging().buckets()),
        total_provision(statements.ar_aging().buckets())
    );
    Ok(())
}

#[test]
fn test_json_lines_round_trip_preserves_subtotals() -> anyhow::Result<()> {
    let statements = fixtures::reference_statements()?;
    let lines = statements.activity().to_json_lines()?;
    assert_eq!(lines.lines().count(), 7);

    let reloaded = Ledger::from_json_lines(&lines)?;
    assert_eq!(&reloaded, statements.activity());
    assert_eq!(
        category_subtotal(reloaded.items(), Category::Revenue),
        5_700_000_000.0
    );
    assert_eq!(operating_surplus(reloaded.items()), 1_600_000_000.0);
    Ok(())
}

#[test]
fn test_statements_file_round_trip() -> anyhow::Result<()> {
    let statements = fixtures::reference_statements()?;
    let path = std::env::temp_dir().join(format!("blu-statements-{}.json", std::process::id()));

    statements.save(&path)?;
    let reloaded = FinancialStatements::load(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(
        compute_view_model(&reloaded),
        compute_view_model(&statements)
    );
    Ok(())
}

#[test]
fn test_malformed_fixtures_are_rejected() {
    let wrong_rate = r#"{
        "balanceSheet": [],
        "activity": [],
        "arAging": [
            { "range": "0-6 months", "amount": 1, "provisionRate": 0 },
            { "range": "6-12 months", "amount": 1, "provisionRate": 0.25 },
            { "range": "> 12 months", "amount": 1, "provisionRate": 1 }
        ]
    }"#;
    assert!(FinancialStatements::from_json(wrong_rate).is_err());

    let missing_bucket = r#"{
        "balanceSheet": [],
        "activity": [],
        "arAging": [{ "range": "0-6 months", "amount": 1, "provisionRate": 0 }]
    }"#;
    assert!(FinancialStatements::from_json(missing_bucket).is_err());

    let negative = r#"[{"id":"1","name":"Kas","currentValue":-5,"previousValue":1,"category":"asset"}]"#;
    assert!(Ledger::from_json(negative).is_err());

    let duplicate = r#"[
        {"id":"1","name":"Kas","currentValue":5,"previousValue":1,"category":"asset"},
        {"id":"1","name":"Bank","currentValue":5,"previousValue":1,"category":"asset"}
    ]"#;
    assert!(Ledger::from_json(duplicate).is_err());

    let revenue_on_balance_sheet = r#"{
        "balanceSheet": [{"id":"r1","name":"Pendapatan","currentValue":5,"previousValue":1,"category":"revenue"}],
        "activity": [],
        "arAging": [
            { "range": "0-6 months", "amount": 1, "provisionRate": 0 },
            { "range": "6-12 months", "amount": 1, "provisionRate": 0.5 },
            { "range": "> 12 months", "amount": 1, "provisionRate": 1 }
        ]
    }"#;
    assert!(matches!(
        FinancialStatements::from_json(revenue_on_balance_sheet),
        Err(BluFinanceError::MalformedLineItem { .. })
    ));
}

#[test]
fn test_csv_export_parses() -> anyhow::Result<()> {
    let view = compute_view_model(&fixtures::reference_statements()?);
    let csv_text = view.to_csv();

    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let headers = reader.headers()?.clone();
    assert_eq!(&headers[2], "Account Name");

    let records: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    assert_eq!(records.len(), 16);

    let cash = &records[0];
    assert_eq!(&cash[0], "Aset (Assets)");
    assert_eq!(&cash[3], "Lancar");
    assert_eq!(&cash[4], "1500000000.00");
    assert_eq!(&cash[6], "25.0");

    let last = records.last().unwrap();
    assert_eq!(&last[1], "e4");
    assert_eq!(&last[6], "0.0");
    Ok(())
}

#[test]
fn test_markdown_report() {
    let view = compute_view_model(&fixtures::reference_statements().unwrap());
    let markdown = view.to_markdown();

    assert!(markdown.contains("# Laporan Keuangan BLU"));
    assert!(markdown.contains("Kas dan Setara Kas (Lancar)"));
    assert!(markdown.contains("| > 12 months | Rp 50.000.000,00 | 100% | Rp 50.000.000,00 |"));
    assert!(markdown.contains("**Rp 125.000.000,00**"));
    assert!(markdown.contains(&format_idr(1_600_000_000.0)));
}

#[test]
fn test_draft_request_for_mock_patient() {
    let patients = fixtures::mock_patients().unwrap();
    let patient = find_patient(&patients, "p1").unwrap();

    let request =
        DraftRequest::for_patient("test-key", patient, patient.default_note(), DraftTask::Soap)
            .unwrap();

    assert!(request.context.starts_with("PATIENT CONTEXT:\nName: Budi Santoso\n"));
    assert!(request.context.contains("Gender: male\nBirthDate: 1980-05-15\n"));
    assert!(request.context.contains("DOCTOR NOTES:\nPatient presents with complaints"));
    assert!(request.system_prompt().contains("SOAP"));

    let latest = patient.latest_encounter().unwrap();
    assert_eq!(latest.reason_code.as_ref().unwrap()[0].text, "Hypertension follow-up");

    assert!(find_patient(&patients, "p404").is_none());
    assert!(matches!(
        DraftRequest::for_patient("", patient, "note", DraftTask::Summary),
        Err(BluFinanceError::MissingCredential)
    ));
}

#[test]
fn test_fixture_schema_describes_wire_format() {
    let schema = fixture_schema_as_json().unwrap();
    assert!(schema.contains("arAging"));
    assert!(schema.contains("subcategory"));
}
