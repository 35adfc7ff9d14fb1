//! Artifact writers for the three published output formats.
//!
//! Each writer creates parent directories as needed, writes the whole
//! artifact in one pass and returns the number of data records written.
//! The formats deliberately differ in how absent optional fields appear:
//! CSV writes an empty string, JSONL an explicit `null`, XML omits the
//! attribute.

pub mod csv;
pub mod jsonl;
pub mod xml;

use std::fs;
use std::path::Path;

use crate::error::Result;

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
