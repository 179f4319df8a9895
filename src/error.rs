use thiserror::Error;

#[derive(Error, Debug)]
pub enum BluFinanceError {
    #[error("Malformed line item '{id}': {details}")]
    MalformedLineItem { id: String, details: String },

    #[error("Duplicate line item id: {0}")]
    DuplicateLineItemId(String),

    #[error("Unknown aging range: {0}")]
    InvalidAgingRange(String),

    #[error("Invalid provision rate {rate} for aging range '{range}': regulatory rate is {expected}")]
    InvalidProvisionRate {
        range: String,
        rate: f64,
        expected: f64,
    },

    #[error("Invalid receivable amount {amount} for aging range '{range}'")]
    InvalidAgingAmount { range: String, amount: f64 },

    #[error("Aging range '{0}' appears more than once")]
    DuplicateAgingBucket(String),

    #[error("Aging schedule has no bucket for range '{0}'")]
    MissingAgingBucket(String),

    #[error("Malformed patient record: {0}")]
    MalformedPatientRecord(String),

    #[error("API key is required")]
    MissingCredential,

    #[cfg(feature = "gemini")]
    #[error("Drafting service rejected the API key: {0}")]
    InvalidCredential(String),

    #[cfg(feature = "gemini")]
    #[error("Drafting failed: {0}")]
    DraftingFailed(String),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BluFinanceError>;
