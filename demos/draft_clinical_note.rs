use blu_finance_core::clinical::find_patient;
use blu_finance_core::llm::ClinicalDrafter;
use blu_finance_core::*;
use dotenv::dotenv;
use std::error::Error;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    dotenv().ok();

    let store = CredentialStore::load(".blu-dashboard/settings.json")?;
    let Some(api_key) = store.api_key() else {
        return Err("Set GEMINI_API_KEY or save a key in .blu-dashboard/settings.json".into());
    };

    let patient_id = std::env::args().nth(1).unwrap_or_else(|| "p1".to_string());
    let task = match std::env::args().nth(2).as_deref() {
        Some("soap") => DraftTask::Soap,
        _ => DraftTask::Summary,
    };

    let patients = fixtures::mock_patients()?;
    let patient = find_patient(&patients, &patient_id)
        .ok_or_else(|| format!("Unknown patient id: {}", patient_id))?;

    let request = DraftRequest::for_patient(api_key, patient, patient.default_note(), task)?;

    println!("📝 Drafting {} for {}...\n", task, patient.id);

    let drafter = ClinicalDrafter::from_settings(store.settings());
    match drafter.draft(&request).await {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("❌ Failed to generate draft. Please check your API key and connection.");
            return Err(e.into());
        }
    }

    Ok(())
}
