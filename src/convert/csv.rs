use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::model::ParseResult;

/// German column names for the CSV output.
pub const CSV_HEADERS: [&str; 9] = [
    "Name",
    "Anschrift",
    "Veröffentlichung",
    "Rechtskräftig",
    "Seit",
    "Geburts-Datum",
    "Firmenbuch-Nr",
    "UID-Nr.",
    "Kennziffer des UR",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write the records as UTF-8 CSV with a BOM for Excel compatibility.
///
/// Layout:
/// - line 1: `# Stand: YYYY-MM-DD HH:MM:SS` comment
/// - line 2: German header row
/// - data rows, minimally quoted, absent optionals as empty strings
///
/// Returns the number of data rows written.
pub fn write_csv(result: &ParseResult, output: &Path) -> Result<usize> {
    super::ensure_parent_dir(output)?;

    let mut file = File::create(output)?;
    file.write_all(UTF8_BOM)?;
    writeln!(file, "# Stand: {} {}", result.stand_datum, result.stand_zeit)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(CSV_HEADERS)?;

    for rec in &result.records {
        writer.write_record([
            rec.name.as_str(),
            rec.anschrift.as_str(),
            rec.veroeffentlichung.as_str(),
            rec.rechtskraeftig.as_str(),
            rec.seit.as_deref().unwrap_or(""),
            rec.geburtsdatum.as_deref().unwrap_or(""),
            rec.firmenbuch_nr.as_deref().unwrap_or(""),
            rec.uid_nr.as_deref().unwrap_or(""),
            rec.kennziffer_ur.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;

    debug!(rows = result.records.len(), path = %output.display(), "wrote CSV artifact");
    Ok(result.records.len())
}
