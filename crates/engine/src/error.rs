use std::fmt;

/// Structural failures — fatal for the whole call, no partial report.
///
/// Per-cell coercion problems in the Latin/custodian comparison are not
/// errors: the offending symbol lands in the report's skip list instead.
#[derive(Debug)]
pub enum EngineError {
    /// Required column header absent from a source table.
    MissingColumn { source: &'static str, column: String },
    /// None of the expected sheets exist in the transactions workbook.
    MissingSheets { expected: Vec<String> },
    /// Quantity cell failed coercion where the source format requires a number.
    QuantityParse { source: &'static str, label: String, value: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Layout validation error (inverted window, blank header name, ...).
    ConfigValidation(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { source, column } => {
                write!(f, "{source}: missing column '{column}'")
            }
            Self::MissingSheets { expected } => {
                write!(f, "workbook has none of the expected sheets: {}", expected.join(", "))
            }
            Self::QuantityParse { source, label, value } => {
                write!(f, "{source}, position '{label}': cannot parse quantity '{value}'")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
