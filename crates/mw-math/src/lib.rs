//! Mowing evaluation math utilities.

pub mod math;

pub use math::correlation::*;
pub use math::error_summary::*;
pub use math::ratio::*;
