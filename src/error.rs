use thiserror::Error;

/// Structural errors raised while parsing the raw BMF extract.
///
/// Any of these aborts the parse; no partial record set is produced.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("header mismatch: expected {expected:?}, got {actual:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Line {line}: expected {expected} fields, got {actual}")]
    FieldCount {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Line {line}: invalid date '{value}'")]
    InvalidDate { line: usize, value: String },

    #[error("missing 'Stand:' footer line")]
    MissingStand,

    #[error("input is empty")]
    EmptyInput,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("download failed after {attempts} attempts: {message}")]
    Download { attempts: u32, message: String },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("XML serialization failed: {0}")]
    XmlSer(#[from] quick_xml::SeError),

    #[error("XML deserialization failed: {0}")]
    XmlDe(#[from] quick_xml::DeError),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
