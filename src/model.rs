use serde::{Deserialize, Serialize};

/// One entry from the BMF Scheinfirmen list.
///
/// Field names follow the published JSON Schema property names, which also
/// fixes the JSONL key order. Dates are kept as ISO 8601 strings once the
/// parser has converted them from the source's `DD.MM.YYYY` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheinfirmaRecord {
    /// Name of the company or natural person.
    pub name: String,
    /// Address (PLZ Ort, Strasse Nr).
    pub anschrift: String,
    /// Publication date.
    pub veroeffentlichung: String,
    /// Date the decree became legally binding.
    pub rechtskraeftig: String,
    /// Date designated as shell company.
    pub seit: Option<String>,
    /// Birth date for natural persons.
    pub geburtsdatum: Option<String>,
    /// Company register number (Firmenbuchnummer).
    pub firmenbuch_nr: Option<String>,
    /// VAT identification number (UID-Nummer).
    pub uid_nr: Option<String>,
    /// Register reference code (Kennziffer des Unternehmensregisters).
    pub kennziffer_ur: Option<String>,
}

/// Output of a successful parse: all records plus the extract's own
/// `Stand:` timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub records: Vec<ScheinfirmaRecord>,
    /// Extract date from the `Stand:` footer, ISO 8601.
    pub stand_datum: String,
    /// Extract time from the `Stand:` footer, `HH:MM:SS`.
    pub stand_zeit: String,
    /// Physical data rows seen in the input, before any cleaning.
    pub raw_row_count: usize,
}

impl ParseResult {
    /// Combined `Stand` timestamp, e.g. `2026-02-10T09:51:32`.
    pub fn stand(&self) -> String {
        format!("{}T{}", self.stand_datum, self.stand_zeit)
    }
}
