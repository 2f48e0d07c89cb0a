// Format contracts of the upstream data providers.
//
// The fixed offsets (row windows, column positions, header names, sheet
// names) are what each provider's export actually looks like today.
// Defaults encode the current contracts; TOML overrides cover a provider
// reshuffling its export.

use std::ops::Range;

use serde::Deserialize;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Row window
// ---------------------------------------------------------------------------

/// Half-open row range `[start, end)` over a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RowWindow {
    pub start: usize,
    pub end: usize,
}

impl RowWindow {
    /// The window clipped to a table of `rows` rows. With `start <= end`
    /// (enforced by validation) the result is always a forward range.
    pub fn clip(&self, rows: usize) -> Range<usize> {
        self.start.min(rows)..self.end.min(rows)
    }
}

// ---------------------------------------------------------------------------
// Per-operation layouts
// ---------------------------------------------------------------------------

/// Latin export vs custodian export (§ latin-custodian operation).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LatinCustodianLayout {
    pub latin_label_col: usize,
    pub latin_qty_col: usize,
    pub custodian_window: RowWindow,
    pub custodian_label_col: usize,
    pub custodian_qty_col: usize,
}

impl Default for LatinCustodianLayout {
    fn default() -> Self {
        Self {
            latin_label_col: 0,
            latin_qty_col: 1,
            custodian_window: RowWindow { start: 6, end: 338 },
            custodian_label_col: 1,
            custodian_qty_col: 3,
        }
    }
}

/// Custodian export vs brokerage delimited export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CustodianBrokerageLayout {
    /// Disclaimer lines before the brokerage header row.
    pub brokerage_skip_rows: usize,
    pub brokerage_label_header: String,
    pub brokerage_qty_header: String,
    pub custodian_window: RowWindow,
    pub custodian_label_col: usize,
    pub custodian_qty_col: usize,
}

impl Default for CustodianBrokerageLayout {
    fn default() -> Self {
        Self {
            brokerage_skip_rows: 1,
            brokerage_label_header: "Financial Instrument Description".into(),
            brokerage_qty_header: "Position".into(),
            custodian_window: RowWindow { start: 6, end: 319 },
            custodian_label_col: 1,
            custodian_qty_col: 4,
        }
    }
}

/// How repeated symbols in the transfer sheets fold into one quantity.
///
/// The upstream report builder keeps the last row seen per symbol, so
/// `LastWriteWins` is the default; `Sum` is the alternative reading for
/// desks that want repeated lines added up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatePolicy {
    #[default]
    LastWriteWins,
    Sum,
}

/// Transfer sheets vs conversions ledger.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransferLayout {
    /// Workbook sheets that hold transfer lines; others are ignored.
    pub sheets: Vec<String>,
    pub assets_header: String,
    pub aggregate: AggregatePolicy,
    pub nemo_header: String,
    pub type_header: String,
    /// Value column when a NEMO has an ADR-typed row.
    pub adr_qty_header: String,
    /// Value column when a NEMO only has CEDEAR-typed rows.
    pub cedear_qty_header: String,
}

impl Default for TransferLayout {
    fn default() -> Self {
        Self {
            sheets: vec![
                "Position Transfer IN".into(),
                "Position Transfer OUT".into(),
            ],
            assets_header: "Assets".into(),
            aggregate: AggregatePolicy::LastWriteWins,
            nemo_header: "NEMO".into(),
            type_header: "Tipo".into(),
            adr_qty_header: "Qty. CEDEAR/ADR".into(),
            cedear_qty_header: "Equiv. Acc USA".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub latin_custodian: LatinCustodianLayout,
    pub custodian_brokerage: CustodianBrokerageLayout,
    pub transfers: TransferLayout,
}

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let windows = [
            ("latin_custodian.custodian_window", self.latin_custodian.custodian_window),
            ("custodian_brokerage.custodian_window", self.custodian_brokerage.custodian_window),
        ];
        for (name, window) in windows {
            if window.start >= window.end {
                return Err(EngineError::ConfigValidation(format!(
                    "{name}: start {} must be below end {}",
                    window.start, window.end
                )));
            }
        }

        if self.transfers.sheets.is_empty() {
            return Err(EngineError::ConfigValidation(
                "transfers.sheets must name at least one sheet".into(),
            ));
        }

        let headers = [
            ("custodian_brokerage.brokerage_label_header", &self.custodian_brokerage.brokerage_label_header),
            ("custodian_brokerage.brokerage_qty_header", &self.custodian_brokerage.brokerage_qty_header),
            ("transfers.assets_header", &self.transfers.assets_header),
            ("transfers.nemo_header", &self.transfers.nemo_header),
            ("transfers.type_header", &self.transfers.type_header),
            ("transfers.adr_qty_header", &self.transfers.adr_qty_header),
            ("transfers.cedear_qty_header", &self.transfers.cedear_qty_header),
        ];
        for (name, header) in headers {
            if header.trim().is_empty() {
                return Err(EngineError::ConfigValidation(format!("{name} must not be blank")));
            }
        }

        Ok(())
    }
}
