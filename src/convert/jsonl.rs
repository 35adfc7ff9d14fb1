use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::model::ParseResult;
use crate::schema::JSON_SCHEMA_URL;

#[derive(Serialize)]
struct MetadataLine<'a> {
    #[serde(rename = "$schema")]
    schema: &'a str,
    #[serde(rename = "_metadata")]
    metadata: Metadata<'a>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    stand: String,
    source: &'a str,
    count: usize,
}

/// Write the records as JSONL, one compact object per line.
///
/// The first line is a metadata object (`$schema` plus `_metadata` with
/// the Stand timestamp, source URL and record count); every following
/// line is one record with absent optionals as explicit `null`.
///
/// Returns the number of data rows written.
pub fn write_jsonl(result: &ParseResult, output: &Path, source_url: &str) -> Result<usize> {
    super::ensure_parent_dir(output)?;

    let mut writer = BufWriter::new(File::create(output)?);

    let meta = MetadataLine {
        schema: JSON_SCHEMA_URL,
        metadata: Metadata {
            stand: result.stand(),
            source: source_url,
            count: result.raw_row_count,
        },
    };
    serde_json::to_writer(&mut writer, &meta)?;
    writer.write_all(b"\n")?;

    for rec in &result.records {
        serde_json::to_writer(&mut writer, rec)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    debug!(rows = result.records.len(), path = %output.display(), "wrote JSONL artifact");
    Ok(result.records.len())
}
