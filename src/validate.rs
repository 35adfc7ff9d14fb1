use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{ParseResult, ScheinfirmaRecord};

static RE_ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static RE_UID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ATU\d{8}$").unwrap());
static RE_FIRMENBUCH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5,6}[a-zA-Z]$").unwrap());

/// Observed Kennziffer shape. Not officially documented, so callers may
/// override it via configuration; mismatches stay warnings either way.
pub const DEFAULT_KENNZIFFER_PATTERN: &str = r"^R\d{3}[A-Z]\d{3,4}[A-Z0-9]?$";

/// A single validation issue. Severity is decided by which list of the
/// [`ValidationReport`] it lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// 1-based row number; 0 for dataset-level issues.
    pub row: usize,
    pub field: &'static str,
    pub value: Option<String>,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {} [{}]: {}", self.row, self.field, self.message)?;
        match &self.value {
            Some(v) => write!(f, " (value={:?})", v),
            None => write!(f, " (value=None)"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check every record of a [`ParseResult`] against the field rules.
///
/// Never fails the call; structural field problems and a too-small row
/// count become errors, known BMF data quirks (the Kennziffer shape)
/// become warnings.
pub fn validate_records(
    result: &ParseResult,
    min_rows: usize,
    kennziffer_pattern: &Regex,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    if result.records.len() < min_rows {
        report.errors.push(ValidationIssue {
            row: 0,
            field: "row_count",
            value: Some(result.records.len().to_string()),
            message: format!("Too few records: {} < {}", result.records.len(), min_rows),
        });
    }

    for (idx, rec) in result.records.iter().enumerate() {
        validate_record(idx + 1, rec, kennziffer_pattern, &mut report);
    }

    report
}

fn validate_record(
    row: usize,
    rec: &ScheinfirmaRecord,
    kennziffer_pattern: &Regex,
    report: &mut ValidationReport,
) {
    let mut err = |field: &'static str, value: Option<&str>, message: String| {
        report.errors.push(ValidationIssue {
            row,
            field,
            value: value.map(str::to_string),
            message,
        });
    };

    if rec.name.is_empty() {
        err("name", Some(&rec.name), "Name must not be empty".into());
    }
    if rec.anschrift.is_empty() {
        err(
            "anschrift",
            Some(&rec.anschrift),
            "Anschrift must not be empty".into(),
        );
    }

    for (field, value) in [
        ("veroeffentlichung", &rec.veroeffentlichung),
        ("rechtskraeftig", &rec.rechtskraeftig),
    ] {
        if !RE_ISO_DATE.is_match(value) {
            err(
                field,
                Some(value),
                format!("Expected ISO date YYYY-MM-DD, got {:?}", value),
            );
        }
    }

    for (field, value) in [("seit", &rec.seit), ("geburtsdatum", &rec.geburtsdatum)] {
        if let Some(v) = value {
            if !RE_ISO_DATE.is_match(v) {
                err(
                    field,
                    Some(v),
                    format!("Expected ISO date YYYY-MM-DD, got {:?}", v),
                );
            }
        }
    }

    if let Some(uid) = &rec.uid_nr {
        if !RE_UID.is_match(uid) {
            err(
                "uid_nr",
                Some(uid),
                "Expected format ATU followed by 8 digits".into(),
            );
        }
    }

    if let Some(fbnr) = &rec.firmenbuch_nr {
        if !RE_FIRMENBUCH.is_match(fbnr) {
            err(
                "firmenbuch_nr",
                Some(fbnr),
                "Expected 5-6 digits followed by a letter".into(),
            );
        }
    }

    if let Some(kz) = &rec.kennziffer_ur {
        if !kennziffer_pattern.is_match(kz) {
            report.warnings.push(ValidationIssue {
                row,
                field: "kennziffer_ur",
                value: Some(kz.clone()),
                message: "Unexpected Kennziffer format (expected R + digits + letter pattern)"
                    .into(),
            });
        }
    }
}
