use std::fs;
use std::path::Path;

use jsonschema::JSONSchema;
use serde_json::Value;
use tracing::debug;

use crate::convert::xml::read_xml;
use crate::error::Result;
use crate::schema::JSON_SCHEMA;

/// No XSD validator exists in this ecosystem; the deep XML check is the
/// full deserialization pass performed during readback.
const XSD_VALIDATION_AVAILABLE: bool = false;

/// Re-read the three written artifacts and check them against each other.
///
/// Checks, per artifact with that format's own skip rules:
/// 1. record count equals `expected_count`
/// 2. first and last record names agree across formats (skipped below
///    2 records)
/// 3. with `deep`, every JSONL record is validated against the embedded
///    JSON Schema
///
/// Returns the list of findings; an empty list means all checks passed.
/// `Err` is reserved for artifacts that cannot be read at all.
pub fn verify_outputs(
    csv_path: &Path,
    jsonl_path: &Path,
    xml_path: &Path,
    expected_count: usize,
    deep: bool,
) -> Result<Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    let csv_names = read_csv_names(csv_path)?;
    let jsonl_names = read_jsonl_names(jsonl_path)?;
    let xml_names = read_xml_names(xml_path)?;

    for (fmt, names) in [
        ("CSV", &csv_names),
        ("JSONL", &jsonl_names),
        ("XML", &xml_names),
    ] {
        if names.len() != expected_count {
            errors.push(format!(
                "{}: expected {} records, found {}",
                fmt,
                expected_count,
                names.len()
            ));
        }
    }

    // Spot check needs a meaningful first/last pair in every format.
    if csv_names.len() >= 2 && jsonl_names.len() >= 2 && xml_names.len() >= 2 {
        let picks = [
            ("First", &csv_names[0], &jsonl_names[0], &xml_names[0]),
            (
                "Last",
                csv_names.last().unwrap(),
                jsonl_names.last().unwrap(),
                xml_names.last().unwrap(),
            ),
        ];
        for (label, c, j, x) in picks {
            if c != j || j != x {
                errors.push(format!(
                    "{} record name mismatch across formats: CSV={:?} JSONL={:?} XML={:?}",
                    label, c, j, x
                ));
            }
        }
    } else {
        debug!("fewer than 2 records in some artifact, skipping name spot check");
    }

    if deep {
        errors.extend(deep_check_jsonl(jsonl_path)?);
        if !XSD_VALIDATION_AVAILABLE {
            debug!("XSD validation unavailable, XML deep check covered by readback");
        }
    }

    Ok(errors)
}

/// Data rows of the CSV artifact, skipping the BOM, `#` comment lines
/// and the header row.
fn read_csv_names(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read(path)?;
    let content = raw.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(&raw);

    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .from_reader(content);
    let name_idx = reader
        .headers()?
        .iter()
        .position(|h| h == "Name")
        .unwrap_or(0);

    let mut names = Vec::new();
    for record in reader.records() {
        let record = record?;
        names.push(record.get(name_idx).unwrap_or("").to_string());
    }
    Ok(names)
}

/// Data lines of the JSONL artifact, skipping blanks and the metadata line.
fn read_jsonl_names(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    let mut names = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let obj: Value = serde_json::from_str(line)?;
        if obj.get("_metadata").is_some() {
            continue;
        }
        names.push(obj.get("name").and_then(Value::as_str).unwrap_or("").to_string());
    }
    Ok(names)
}

/// `<scheinfirma>` element names from the XML artifact.
fn read_xml_names(path: &Path) -> Result<Vec<String>> {
    let doc = read_xml(path)?;
    Ok(doc.entries.into_iter().map(|e| e.name).collect())
}

/// Validate every JSONL data record against the embedded JSON Schema.
fn deep_check_jsonl(path: &Path) -> Result<Vec<String>> {
    let schema_json: Value = serde_json::from_str(JSON_SCHEMA)?;
    let compiled = JSONSchema::options()
        .compile(&schema_json)
        .map_err(|e| crate::error::PipelineError::Config(format!("embedded schema invalid: {}", e)))?;

    let text = fs::read_to_string(path)?;
    let mut errors = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let obj: Value = serde_json::from_str(line)?;
        if obj.get("_metadata").is_some() {
            continue;
        }
        let line_errors: Vec<String> = match compiled.validate(&obj) {
            Ok(()) => Vec::new(),
            Err(violations) => violations
                .map(|violation| {
                    format!(
                        "JSONL schema: line {}: {} (at {})",
                        line_no + 1,
                        violation,
                        violation.instance_path
                    )
                })
                .collect(),
        };
        errors.extend(line_errors);
    }
    Ok(errors)
}
