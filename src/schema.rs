//! Published schema documents for the data artifacts.
//!
//! Both documents are embedded at compile time and written next to the
//! artifacts so consumers of the output directory get the schemas that
//! actually describe the files beside them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// Canonical published location of the JSON Schema, referenced by the
/// JSONL metadata line.
pub const JSON_SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/arjoma/scheinfirmen-at/main/data/scheinfirmen.json-schema.json";

/// Canonical published location of the XSD, referenced by the XML root's
/// `xsi:noNamespaceSchemaLocation`.
pub const XSD_URL: &str =
    "https://raw.githubusercontent.com/arjoma/scheinfirmen-at/main/data/scheinfirmen.xsd";

pub const JSON_SCHEMA: &str = include_str!("../schemas/scheinfirmen.schema.json");
pub const XSD: &str = include_str!("../schemas/scheinfirmen.xsd");

pub const JSON_SCHEMA_FILE: &str = "scheinfirmen.json-schema.json";
pub const XSD_FILE: &str = "scheinfirmen.xsd";

/// Write both schema documents into the output directory. Returns the
/// paths of the JSON Schema and the XSD.
pub fn write_schema_docs(output_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir)?;

    let json_path = output_dir.join(JSON_SCHEMA_FILE);
    fs::write(&json_path, JSON_SCHEMA)?;

    let xsd_path = output_dir.join(XSD_FILE);
    fs::write(&xsd_path, XSD)?;

    debug!(dir = %output_dir.display(), "wrote schema documents");
    Ok((json_path, xsd_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_json_schema_is_valid_and_compiles() {
        let schema: serde_json::Value = serde_json::from_str(JSON_SCHEMA).unwrap();
        assert_eq!(schema["$id"], JSON_SCHEMA_URL);
        assert_eq!(schema["title"], "Scheinfirma");
        jsonschema::JSONSchema::options()
            .compile(&schema)
            .expect("embedded JSON Schema must compile");
    }

    #[test]
    fn embedded_xsd_is_well_formed() {
        let mut reader = quick_xml::Reader::from_str(XSD);
        loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("XSD not well-formed: {}", e),
            }
        }
    }

    #[test]
    fn writes_both_documents() {
        let dir = tempfile::tempdir().unwrap();
        let (json_path, xsd_path) = write_schema_docs(dir.path()).unwrap();
        assert!(json_path.exists());
        assert!(xsd_path.exists());
        assert_eq!(std::fs::read_to_string(&json_path).unwrap(), JSON_SCHEMA);
    }
}
