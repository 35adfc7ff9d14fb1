use std::fs::File;
use std::io::Write;
use std::path::Path;

use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::model::ParseResult;
use crate::schema::XSD_URL;

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Root document: `<scheinfirmen>` with extract metadata as attributes.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "scheinfirmen")]
pub struct ScheinfirmenXml {
    #[serde(rename = "@xmlns:xsi", alias = "@xsi")]
    pub xmlns_xsi: String,
    #[serde(rename = "@xsi:noNamespaceSchemaLocation", alias = "@noNamespaceSchemaLocation")]
    pub schema_location: String,
    #[serde(rename = "@stand")]
    pub stand: String,
    #[serde(rename = "@zeit")]
    pub zeit: String,
    #[serde(rename = "@quelle")]
    pub quelle: String,
    #[serde(rename = "@anzahl")]
    pub anzahl: usize,
    #[serde(rename = "scheinfirma", default)]
    pub entries: Vec<ScheinfirmaEntry>,
}

/// One `<scheinfirma>` element: name as text content, everything else as
/// attributes, absent optionals omitted entirely.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScheinfirmaEntry {
    #[serde(rename = "@anschrift")]
    pub anschrift: String,
    #[serde(rename = "@veroeffentlichung")]
    pub veroeffentlichung: String,
    #[serde(rename = "@rechtskraeftig")]
    pub rechtskraeftig: String,
    #[serde(rename = "@seit", default, skip_serializing_if = "Option::is_none")]
    pub seit: Option<String>,
    #[serde(rename = "@geburtsdatum", default, skip_serializing_if = "Option::is_none")]
    pub geburtsdatum: Option<String>,
    #[serde(rename = "@firmenbuch_nr", default, skip_serializing_if = "Option::is_none")]
    pub firmenbuch_nr: Option<String>,
    #[serde(rename = "@uid_nr", default, skip_serializing_if = "Option::is_none")]
    pub uid_nr: Option<String>,
    #[serde(rename = "@kennziffer_ur", default, skip_serializing_if = "Option::is_none")]
    pub kennziffer_ur: Option<String>,
    #[serde(rename = "$text")]
    pub name: String,
}

/// Write the records as indented XML with an XML declaration.
///
/// Returns the number of records written.
pub fn write_xml(result: &ParseResult, output: &Path, source_url: &str) -> Result<usize> {
    super::ensure_parent_dir(output)?;

    let doc = ScheinfirmenXml {
        xmlns_xsi: XSI_NAMESPACE.to_string(),
        schema_location: XSD_URL.to_string(),
        stand: result.stand_datum.clone(),
        zeit: result.stand_zeit.clone(),
        quelle: source_url.to_string(),
        anzahl: result.raw_row_count,
        entries: result
            .records
            .iter()
            .map(|rec| ScheinfirmaEntry {
                anschrift: rec.anschrift.clone(),
                veroeffentlichung: rec.veroeffentlichung.clone(),
                rechtskraeftig: rec.rechtskraeftig.clone(),
                seit: rec.seit.clone(),
                geburtsdatum: rec.geburtsdatum.clone(),
                firmenbuch_nr: rec.firmenbuch_nr.clone(),
                uid_nr: rec.uid_nr.clone(),
                kennziffer_ur: rec.kennziffer_ur.clone(),
                name: rec.name.clone(),
            })
            .collect(),
    };

    let mut body = String::new();
    let mut ser = Serializer::new(&mut body);
    ser.indent(' ', 2);
    doc.serialize(ser)?;

    let mut file = File::create(output)?;
    file.write_all(XML_DECLARATION.as_bytes())?;
    file.write_all(body.as_bytes())?;
    file.write_all(b"\n")?;

    debug!(rows = result.records.len(), path = %output.display(), "wrote XML artifact");
    Ok(result.records.len())
}

/// Read a written XML artifact back into its document form.
pub fn read_xml(path: &Path) -> Result<ScheinfirmenXml> {
    let text = std::fs::read_to_string(path)?;
    Ok(quick_xml::de::from_str(&text)?)
}
