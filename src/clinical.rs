//! Patient records and the context contract for drafting clinical documents.
//!
//! The crate never decides *what* the drafting service writes. It only
//! assembles the input: a fixed system prompt selected by [`DraftTask`] and a
//! plain-text context block built from a [`PatientRecord`] and free-text notes.

use crate::error::{BluFinanceError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanName {
    pub family: String,
    #[serde(default)]
    pub given: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    pub system: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FhirPatient {
    pub resource_type: String,
    pub id: String,
    pub name: Vec<HumanName>,
    pub gender: String,
    pub birth_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<ContactPoint>>,
}

impl FhirPatient {
    /// Given names followed by the family name, from the first name entry.
    pub fn display_name(&self) -> Option<String> {
        let name = self.name.first()?;
        let mut parts: Vec<&str> = name.given.iter().map(String::as_str).collect();
        parts.push(&name.family);
        Some(parts.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeableText {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FhirEncounter {
    pub resource_type: String,
    pub id: String,
    pub status: String,
    pub subject: Reference,
    pub period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<Vec<CodeableText>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub id: String,
    pub fhir_data: FhirPatient,
    #[serde(default)]
    pub encounters: Vec<FhirEncounter>,
    #[serde(default)]
    pub clinical_notes: Vec<String>,
}

impl PatientRecord {
    pub fn latest_encounter(&self) -> Option<&FhirEncounter> {
        self.encounters.iter().max_by_key(|e| e.period.start)
    }

    /// The note used to pre-fill the drafting form.
    pub fn default_note(&self) -> &str {
        self.clinical_notes.first().map(String::as_str).unwrap_or("")
    }
}

pub fn find_patient<'a>(patients: &'a [PatientRecord], id: &str) -> Option<&'a PatientRecord> {
    patients.iter().find(|p| p.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftTask {
    /// After Visit Summary focused on instructions and next steps.
    Summary,
    /// Subjective, Objective, Assessment, Plan.
    Soap,
}

impl DraftTask {
    pub fn instruction(&self) -> &'static str {
        match self {
            DraftTask::Summary => "Create a concise 'After Visit Summary' for the patient based on the doctor's notes. Focus on instructions and next steps.",
            DraftTask::Soap => "Structure the provided unstructured notes into a standard SOAP (Subjective, Objective, Assessment, Plan) format.",
        }
    }
}

impl fmt::Display for DraftTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftTask::Summary => f.write_str("summary"),
            DraftTask::Soap => f.write_str("soap"),
        }
    }
}

const SYSTEM_PROMPT_HEADER: &str = "ROLE: You are an expert Medical Administrative Assistant for a hospital.

CRITICAL SAFETY CONSTRAINTS:
1. DO NOT DIAGNOSE, prescribe, or offer medical advice.
2. Your output is a DRAFT for documentation purposes only.
3. If the input contains insufficient information, state that clearly.
4. Maintain strict patient confidentiality principles (though this is a local simulation).
5. Be objective and concise.

TASK:
";

pub fn system_prompt(task: DraftTask) -> String {
    format!("{}{}\n", SYSTEM_PROMPT_HEADER, task.instruction())
}

/// Builds the plain-text block sent as the user content of a draft request.
pub fn build_context(patient: &PatientRecord, notes: &str) -> Result<String> {
    let name = patient.fhir_data.display_name().ok_or_else(|| {
        BluFinanceError::MalformedPatientRecord(format!("patient '{}' has no name", patient.id))
    })?;

    Ok(format!(
        "PATIENT CONTEXT:\n\
         Name: {}\n\
         Gender: {}\n\
         BirthDate: {}\n\
         \n\
         DOCTOR NOTES:\n\
         {}\n",
        name,
        patient.fhir_data.gender,
        patient.fhir_data.birth_date.format("%Y-%m-%d"),
        notes.trim()
    ))
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRequest {
    pub credential: String,
    pub context: String,
    pub task: DraftTask,
}

impl DraftRequest {
    pub fn new(credential: impl Into<String>, context: String, task: DraftTask) -> Result<Self> {
        let credential = credential.into();
        if credential.trim().is_empty() {
            return Err(BluFinanceError::MissingCredential);
        }

        Ok(Self {
            credential,
            context,
            task,
        })
    }

    pub fn for_patient(
        credential: impl Into<String>,
        patient: &PatientRecord,
        notes: &str,
        task: DraftTask,
    ) -> Result<Self> {
        Self::new(credential, build_context(patient, notes)?, task)
    }

    pub fn system_prompt(&self) -> String {
        system_prompt(self.task)
    }
}

impl fmt::Debug for DraftRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftRequest")
            .field("credential", &"<redacted>")
            .field("context", &self.context)
            .field("task", &self.task)
            .finish()
    }
}
