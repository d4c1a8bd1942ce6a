//! Config snapshots for report provenance.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::eval::EvalConfig;

/// The effective configuration of a run plus where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Effective parameters after all overrides.
    pub config: EvalConfig,
    /// Config file that was read (None if built-in defaults).
    pub config_path: Option<PathBuf>,
    /// SHA-256 of the config file content.
    pub config_hash: Option<String>,
    /// Where the config file was found.
    pub source: String,
    /// Parameters overridden by environment or CLI, in application order.
    pub overrides: Vec<String>,
}

/// Hex SHA-256 digest of a file's contents.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hex SHA-256 digest of an in-memory buffer.
pub fn hash_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
