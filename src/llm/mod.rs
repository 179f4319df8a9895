pub mod client;
pub mod drafter;
pub mod types;

pub use client::*;
pub use drafter::*;
pub use types::*;
