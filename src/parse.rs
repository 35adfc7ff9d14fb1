use chrono::NaiveDate;
use once_cell::sync::Lazy;
use quick_xml::escape::unescape;
use regex::Regex;
use tracing::debug;

use crate::error::FormatError;
use crate::model::{ParseResult, ScheinfirmaRecord};

/// Column names the BMF extract must carry, compared after trimming.
pub const EXPECTED_HEADERS: [&str; 9] = [
    "Name",
    "Anschrift",
    "Veröffentlichung",
    "Rechtskraft Bescheid",
    "Zeitpunkt als Scheinunternehmen",
    "Geburts-Datum",
    "Firmenbuch-Nr",
    "UID-Nr.",
    "Kennziffer des UR",
];

static STAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Stand:\s+(\d{2}\.\d{2}\.\d{4})\s+(\d{2}:\d{2}:\d{2})\s*$").unwrap()
});

/// Parse the raw tilde-delimited BMF extract into structured records.
///
/// Steps:
/// 1. Decode from ISO-8859-1
/// 2. Normalize line endings (CRLF/CR to LF)
/// 3. Match the header line against [`EXPECTED_HEADERS`]
/// 4. Split each data row on `~`, clean and convert fields
/// 5. Capture the `Stand:` footer timestamp
///
/// All-or-nothing: the first structural problem aborts the parse and no
/// partial record set is returned.
pub fn parse_bmf_extract(raw_data: &[u8]) -> Result<ParseResult, FormatError> {
    // ISO-8859-1 maps every byte to the Unicode code point of the same value.
    let text: String = raw_data.iter().map(|&b| b as char).collect();
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    if text.trim().is_empty() {
        return Err(FormatError::EmptyInput);
    }
    let lines: Vec<&str> = text.split('\n').collect();

    let actual_headers: Vec<String> = lines[0].split('~').map(|h| h.trim().to_string()).collect();
    if actual_headers != EXPECTED_HEADERS {
        return Err(FormatError::HeaderMismatch {
            expected: EXPECTED_HEADERS.iter().map(|h| h.to_string()).collect(),
            actual: actual_headers,
        });
    }

    let mut records: Vec<ScheinfirmaRecord> = Vec::new();
    let mut stand: Option<(String, String)> = None;

    for (idx, line) in lines.iter().enumerate().skip(1) {
        // Physical line number, header line is 1.
        let line_no = idx + 1;
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }

        if let Some(caps) = STAND_RE.captures(stripped) {
            let datum = convert_date(&caps[1], line_no)?;
            stand = Some((datum, caps[2].to_string()));
            continue;
        }

        let mut fields: Vec<&str> = line.split('~').collect();
        // Rows with an empty Kennziffer carry a trailing tilde, producing a
        // tenth empty part.
        if fields.len() == 10 && fields[9].is_empty() {
            fields.truncate(9);
        }
        if fields.len() != 9 {
            return Err(FormatError::FieldCount {
                line: line_no,
                expected: 9,
                actual: fields.len(),
            });
        }

        let opt = |v: &str| -> Option<String> {
            let cleaned = clean_field(v);
            (!cleaned.is_empty()).then_some(cleaned)
        };
        let opt_date = |v: &str| -> Result<Option<String>, FormatError> {
            let cleaned = clean_field(v);
            if cleaned.is_empty() {
                Ok(None)
            } else {
                convert_date(&cleaned, line_no).map(Some)
            }
        };

        records.push(ScheinfirmaRecord {
            name: clean_field(fields[0]),
            anschrift: clean_field(fields[1]),
            veroeffentlichung: convert_date(&clean_field(fields[2]), line_no)?,
            rechtskraeftig: convert_date(&clean_field(fields[3]), line_no)?,
            seit: opt_date(fields[4])?,
            geburtsdatum: opt_date(fields[5])?,
            firmenbuch_nr: opt(fields[6]),
            uid_nr: opt(fields[7]),
            kennziffer_ur: clean_kennziffer(fields[8]),
        });
    }

    let (stand_datum, stand_zeit) = stand.ok_or(FormatError::MissingStand)?;
    let raw_row_count = records.len();
    debug!(rows = raw_row_count, stand = %stand_datum, "parsed BMF extract");

    Ok(ParseResult {
        records,
        stand_datum,
        stand_zeit,
        raw_row_count,
    })
}

/// Convert `DD.MM.YYYY` to `YYYY-MM-DD`. Calendar overflow (day 32,
/// month 13) is rejected, not wrapped.
fn convert_date(value: &str, line_no: usize) -> Result<String, FormatError> {
    NaiveDate::parse_from_str(value.trim(), "%d.%m.%Y")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| FormatError::InvalidDate {
            line: line_no,
            value: value.to_string(),
        })
}

/// Unescape XML entities and trim. A value that fails to unescape is kept
/// raw; a broken entity is a content blemish, not a structural error.
fn clean_field(value: &str) -> String {
    match unescape(value) {
        Ok(cow) => cow.trim().to_string(),
        Err(_) => value.trim().to_string(),
    }
}

/// The Kennziffer column sometimes arrives wrapped in `&quot;...&quot;`.
/// Strip the quotes left behind by unescaping, then trim again.
fn clean_kennziffer(value: &str) -> Option<String> {
    let cleaned = clean_field(value);
    let cleaned = cleaned.trim_matches('"').trim().to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Name~Anschrift~Veröffentlichung~Rechtskraft Bescheid~Zeitpunkt als Scheinunternehmen~Geburts-Datum~Firmenbuch-Nr~UID-Nr.~Kennziffer des UR";

    fn latin1(s: &str) -> Vec<u8> {
        s.chars().map(|c| c as u32 as u8).collect()
    }

    fn extract(rows: &[&str]) -> Vec<u8> {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.push_str("\nStand: 10.02.2026 09:51:32\n");
        latin1(&text)
    }

    #[test]
    fn parses_full_row() {
        let data = extract(&[
            "Müller GmbH~1010 Wien, Graben 1~05.01.2026~20.01.2026~01.12.2025~~597821z~ATU79209223~R133R5574",
        ]);
        let result = parse_bmf_extract(&data).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.raw_row_count, 1);
        let rec = &result.records[0];
        assert_eq!(rec.name, "Müller GmbH");
        assert_eq!(rec.anschrift, "1010 Wien, Graben 1");
        assert_eq!(rec.veroeffentlichung, "2026-01-05");
        assert_eq!(rec.rechtskraeftig, "2026-01-20");
        assert_eq!(rec.seit.as_deref(), Some("2025-12-01"));
        assert_eq!(rec.geburtsdatum, None);
        assert_eq!(rec.firmenbuch_nr.as_deref(), Some("597821z"));
        assert_eq!(rec.uid_nr.as_deref(), Some("ATU79209223"));
        assert_eq!(rec.kennziffer_ur.as_deref(), Some("R133R5574"));
    }

    #[test]
    fn captures_stand_footer() {
        let data = extract(&["A~B~01.01.2026~02.01.2026~~~~~"]);
        let result = parse_bmf_extract(&data).unwrap();
        assert_eq!(result.stand_datum, "2026-02-10");
        assert_eq!(result.stand_zeit, "09:51:32");
        assert_eq!(result.stand(), "2026-02-10T09:51:32");
    }

    #[test]
    fn tolerates_trailing_tilde_with_empty_kennziffer() {
        let data = extract(&["A~B~01.01.2026~02.01.2026~~~~~~"]);
        let result = parse_bmf_extract(&data).unwrap();
        assert_eq!(result.records[0].kennziffer_ur, None);
    }

    #[test]
    fn empty_optionals_become_none() {
        let data = extract(&["A~B~01.01.2026~02.01.2026~~~~~"]);
        let rec = &parse_bmf_extract(&data).unwrap().records[0];
        assert_eq!(rec.seit, None);
        assert_eq!(rec.geburtsdatum, None);
        assert_eq!(rec.firmenbuch_nr, None);
        assert_eq!(rec.uid_nr, None);
        assert_eq!(rec.kennziffer_ur, None);
    }

    #[test]
    fn unescapes_entities_and_strips_kennziffer_quotes() {
        let data = extract(&[
            "Huber &amp; Söhne~B~01.01.2026~02.01.2026~~~~~&quot;R567Z890&quot;",
        ]);
        let rec = &parse_bmf_extract(&data).unwrap().records[0];
        assert_eq!(rec.name, "Huber & Söhne");
        assert_eq!(rec.kennziffer_ur.as_deref(), Some("R567Z890"));
    }

    #[test]
    fn decodes_latin1_umlauts() {
        let data = extract(&["Öhlinger Bäckerei~B~01.01.2026~02.01.2026~~~~~"]);
        // 0xD6 and 0xE4 must round-trip to Ö and ä.
        assert!(data.contains(&0xD6));
        assert!(data.contains(&0xE4));
        let rec = &parse_bmf_extract(&data).unwrap().records[0];
        assert_eq!(rec.name, "Öhlinger Bäckerei");
    }

    #[test]
    fn normalizes_crlf_line_endings() {
        let text = format!(
            "{}\r\nA~B~01.01.2026~02.01.2026~~~~~\r\nStand: 10.02.2026 09:51:32\r\n",
            HEADER
        );
        let result = parse_bmf_extract(&latin1(&text)).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].name, "A");
    }

    #[test]
    fn rejects_header_mismatch() {
        let data = latin1("Name~Wrong~Header\nStand: 10.02.2026 09:51:32\n");
        match parse_bmf_extract(&data) {
            Err(FormatError::HeaderMismatch { .. }) => {}
            other => panic!("expected HeaderMismatch, got {:?}", other),
        }
    }

    #[test]
    fn rejects_wrong_field_count_with_line_number() {
        let data = extract(&[
            "A~B~01.01.2026~02.01.2026~~~~~ok",
            "A~B~too~few",
        ]);
        match parse_bmf_extract(&data) {
            Err(FormatError::FieldCount { line, expected, actual }) => {
                assert_eq!(line, 3);
                assert_eq!(expected, 9);
                assert_eq!(actual, 4);
            }
            other => panic!("expected FieldCount, got {:?}", other),
        }
    }

    #[test]
    fn rejects_calendar_overflow() {
        let data = extract(&["A~B~32.01.2026~02.01.2026~~~~~"]);
        match parse_bmf_extract(&data) {
            Err(FormatError::InvalidDate { value, .. }) => assert_eq!(value, "32.01.2026"),
            other => panic!("expected InvalidDate, got {:?}", other),
        }
    }

    #[test]
    fn rejects_missing_stand_footer() {
        let data = latin1(&format!("{}\nA~B~01.01.2026~02.01.2026~~~~~\n", HEADER));
        match parse_bmf_extract(&data) {
            Err(FormatError::MissingStand) => {}
            other => panic!("expected MissingStand, got {:?}", other),
        }
    }

    #[test]
    fn rejects_empty_input() {
        match parse_bmf_extract(b"") {
            Err(FormatError::EmptyInput) => {}
            other => panic!("expected EmptyInput, got {:?}", other),
        }
    }

    #[test]
    fn all_or_nothing_on_bad_row() {
        let data = extract(&[
            "A~B~01.01.2026~02.01.2026~~~~~",
            "C~D~99.99.9999~02.01.2026~~~~~",
        ]);
        assert!(parse_bmf_extract(&data).is_err());
    }
}
