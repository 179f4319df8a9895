//! # BLU Finance Core
//!
//! Financial statement aggregation and AR provisioning for a hospital operating
//! under the BLU (Badan Layanan Umum) public-service accounting standard, plus the
//! context contract for drafting clinical documents with a generative-language API.
//!
//! ## Core Concepts
//!
//! - **Ledger**: an ordered, immutable sequence of statement lines, each with current and
//!   previous period values and a category (asset, liability, equity, revenue, expense)
//! - **AR Aging Schedule**: receivables bucketed by age, each with the regulatory
//!   provision rate (0%, 50%, 100%)
//! - **Derived Metrics**: period-over-period change, category subtotals, provisioning
//! - **Display Model**: every figure a dashboard shows, with preformatted rupiah labels
//!
//! Data only flows one way: ledger -> metrics -> display model. Nothing is mutated.
//!
//! ## Example
//!
//! ```rust,ignore
//! use blu_finance_core::*;
//!
//! let statements = fixtures::reference_statements()?;
//! let view = compute_view_model(&statements);
//!
//! assert_eq!(view.ar_aging.total_provision, 125_000_000.0);
//! println!("{}", view.to_markdown());
//! ```

pub mod clinical;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod ledger;
pub mod metrics;
pub mod schema;
pub mod view_model;

#[cfg(feature = "gemini")]
pub mod llm;

pub use clinical::{build_context, system_prompt, DraftRequest, DraftTask, PatientRecord};
pub use config::CredentialStore;
pub use error::{BluFinanceError, Result};
pub use ledger::{AgingSchedule, FinancialStatements, Ledger};
pub use metrics::*;
pub use schema::*;
pub use view_model::{compute_view_model, DisplayModel};
