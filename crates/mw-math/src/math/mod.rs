//! Core math modules.

pub mod correlation;
pub mod error_summary;
pub mod ratio;
