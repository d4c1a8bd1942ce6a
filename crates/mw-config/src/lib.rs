//! Mowing evaluation configuration loading and validation.
//!
//! This crate provides:
//! - Typed evaluation parameters (tolerance, valid mowing range, event spacing)
//! - Config resolution (CLI → env → config file → defaults)
//! - Semantic validation
//! - Config snapshots with provenance hashes for report metadata

pub mod eval;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use eval::{DoyRange, EvalConfig, MetricScope};
pub use resolve::{
    load_config, load_config_with, ConfigError, ConfigOptions, ConfigOverrides, ConfigSource,
    ResolvedConfig,
};
pub use snapshot::{hash_bytes, hash_file, ConfigSnapshot};
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Default tolerance in days for a true-positive match.
pub const DEFAULT_TOLERANCE: u32 = 12;

/// Default first valid mowing day of year.
pub const DEFAULT_RANGE_START: u16 = 75;

/// Default last valid mowing day of year.
pub const DEFAULT_RANGE_END: u16 = 300;

/// Default minimum spacing in days between reference events of one unit/year.
pub const DEFAULT_EVENT_MIN_DIFFERENCE: u32 = 15;
