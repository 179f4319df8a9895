//! Reference data shipped with the dashboard: the BLU statements for the
//! current period and the mock FHIR patients.
//!
//! All figures are fictional.

use crate::clinical::PatientRecord;
use crate::error::Result;
use crate::ledger::FinancialStatements;
use log::debug;

const BLU_STATEMENTS_JSON: &str = include_str!("../fixtures/blu_statements.json");
const PATIENTS_JSON: &str = include_str!("../fixtures/patients.json");

pub fn reference_statements() -> Result<FinancialStatements> {
    FinancialStatements::from_json(BLU_STATEMENTS_JSON)
}

pub fn mock_patients() -> Result<Vec<PatientRecord>> {
    let patients: Vec<PatientRecord> = serde_json::from_str(PATIENTS_JSON)?;
    debug!("Loaded {} mock patients", patients.len());
    Ok(patients)
}
