//! Command implementations: bind files on disk to the three engine
//! operations and shape the output.

use std::fs;
use std::path::Path;

use posrecon_engine::{differ, DiscrepancyReport, EngineError, ReconConfig, Table, Workbook};
use serde::Serialize;

use crate::exit_codes::{EXIT_DIFFS, EXIT_INVALID_CONFIG, EXIT_PARSE};
use crate::{CliError, Commands, OutputOpts};

#[derive(Serialize)]
struct ReportMeta {
    operation: &'static str,
    engine_version: &'static str,
    run_at: String,
}

#[derive(Serialize)]
struct ReportEnvelope<'a> {
    meta: ReportMeta,
    results: &'a DiscrepancyReport,
    skipped: &'a [String],
}

pub fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::LatinCustodian { latin, custodian, opts } => {
            let config = load_config(opts.config.as_deref())?;
            let latin_table = read_sheet(&latin)?;
            let custodian_table = read_sheet(&custodian)?;
            let report =
                differ::diff_latin_custodian(&latin_table, &custodian_table, &config.latin_custodian);
            finish("latin-custodian", &report, &opts)
        }
        Commands::CustodianBrokerage { brokerage, custodian, opts } => {
            let config = load_config(opts.config.as_deref())?;
            let brokerage_table = read_delimited(&brokerage)?;
            let custodian_table = read_sheet(&custodian)?;
            let report = differ::diff_custodian_brokerage(
                &brokerage_table,
                &custodian_table,
                &config.custodian_brokerage,
            )
            .map_err(engine_err)?;
            finish("custodian-brokerage", &report, &opts)
        }
        Commands::Transfers { transactions, conversions, opts } => {
            let config = load_config(opts.config.as_deref())?;
            let workbook = read_workbook(&transactions)?;
            let conversions_table = read_delimited(&conversions)?;
            let report = differ::diff_transfers_conversions(
                &workbook,
                &conversions_table,
                &config.transfers,
            )
            .map_err(engine_err)?;
            finish("transfers", &report, &opts)
        }
    }
}

fn engine_err(err: EngineError) -> CliError {
    CliError { code: EXIT_PARSE, message: err.to_string(), hint: None }
}

fn parse_err(path: &Path, message: String) -> CliError {
    CliError {
        code: EXIT_PARSE,
        message: format!("{}: {message}", path.display()),
        hint: None,
    }
}

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_INVALID_CONFIG,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    ReconConfig::from_toml(&text).map_err(|e| CliError {
        code: EXIT_INVALID_CONFIG,
        message: e.to_string(),
        hint: Some("see the [latin_custodian], [custodian_brokerage] and [transfers] sections".into()),
    })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|e| parse_err(path, format!("cannot read: {e}")))
}

fn read_sheet(path: &Path) -> Result<Table, CliError> {
    let bytes = read_bytes(path)?;
    posrecon_io::xlsx::import_sheet(&bytes).map_err(|e| parse_err(path, e))
}

fn read_workbook(path: &Path) -> Result<Workbook, CliError> {
    let bytes = read_bytes(path)?;
    posrecon_io::xlsx::import_workbook(&bytes).map_err(|e| parse_err(path, e))
}

fn read_delimited(path: &Path) -> Result<Table, CliError> {
    let bytes = read_bytes(path)?;
    posrecon_io::delim::import(&bytes).map_err(|e| parse_err(path, e))
}

fn finish(operation: &'static str, report: &DiscrepancyReport, opts: &OutputOpts) -> Result<(), CliError> {
    let envelope = ReportEnvelope {
        meta: ReportMeta {
            operation,
            engine_version: env!("CARGO_PKG_VERSION"),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        results: report,
        skipped: &report.skipped,
    };

    let json = serde_json::to_string_pretty(&envelope).map_err(|e| CliError {
        code: EXIT_PARSE,
        message: format!("JSON serialization error: {e}"),
        hint: None,
    })?;

    if let Some(path) = &opts.output {
        fs::write(path, &json).map_err(|e| CliError {
            code: EXIT_PARSE,
            message: format!("cannot write {}: {e}", path.display()),
            hint: None,
        })?;
        eprintln!("wrote {}", path.display());
    }

    if opts.json {
        println!("{json}");
    }

    // Human summary to stderr
    eprintln!(
        "{operation}: {} discrepancies, {} symbols skipped as unparseable",
        report.len(),
        report.skipped.len(),
    );

    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError { code: EXIT_DIFFS, message: "discrepancies found".into(), hint: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook as XlsxWorkbook;

    fn custodian_fixture(dir: &Path) -> std::path::PathBuf {
        let mut fixture = XlsxWorkbook::new();
        let sheet = fixture.add_worksheet();
        sheet.write_string(10, 1, "ACME INC").unwrap();
        sheet.write_number(10, 4, 130.0).unwrap();
        let path = dir.join("custodian.xlsx");
        fixture.save(&path).unwrap();
        path
    }

    #[test]
    fn custodian_brokerage_runs_from_files_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let brokerage_path = dir.path().join("brokerage.csv");
        fs::write(
            &brokerage_path,
            "Generated by the desk, do not redistribute\n\
             Financial Instrument Description,Position\n\
             ACME INC,100\n",
        )
        .unwrap();
        let custodian_path = custodian_fixture(dir.path());

        let config = ReconConfig::default();
        let brokerage = read_delimited(&brokerage_path).unwrap();
        let custodian = read_sheet(&custodian_path).unwrap();
        let report =
            differ::diff_custodian_brokerage(&brokerage, &custodian, &config.custodian_brokerage)
                .unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report.entries["ACME INC"].delta, 30.0);
    }

    #[test]
    fn transfers_run_from_files_on_disk() {
        let dir = tempfile::tempdir().unwrap();

        let mut fixture = XlsxWorkbook::new();
        let sheet = fixture.add_worksheet();
        sheet.set_name("Position Transfer IN").unwrap();
        sheet.write_string(0, 0, "Assets").unwrap();
        sheet
            .write_string(1, 0, "transfer of 12.0000 units, Stock Symbol GGAL")
            .unwrap();
        let transactions_path = dir.path().join("transactions.xlsx");
        fixture.save(&transactions_path).unwrap();

        let conversions_path = dir.path().join("conversions.csv");
        fs::write(
            &conversions_path,
            "NEMO;Tipo;Qty. CEDEAR/ADR;Equiv. Acc USA\nGGAL;ADR;10;\n",
        )
        .unwrap();

        let config = ReconConfig::default();
        let workbook = read_workbook(&transactions_path).unwrap();
        let conversions = read_delimited(&conversions_path).unwrap();
        let report =
            differ::diff_transfers_conversions(&workbook, &conversions, &config.transfers).unwrap();

        assert_eq!(report.entries["GGAL"].delta, 2.0);
    }

    #[test]
    fn config_override_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("layout.toml");
        fs::write(&config_path, "[transfers]\naggregate = \"sum\"\n").unwrap();

        let config = load_config(Some(&config_path)).unwrap();
        assert_eq!(
            config.transfers.aggregate,
            posrecon_engine::config::AggregatePolicy::Sum
        );
    }

    #[test]
    fn bad_config_maps_to_config_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("layout.toml");
        fs::write(&config_path, "[latin_custodian]\ncustodian_window = { start = 9, end = 2 }\n")
            .unwrap();

        let err = load_config(Some(&config_path)).unwrap_err();
        assert_eq!(err.code, EXIT_INVALID_CONFIG);
    }

    #[test]
    fn missing_file_maps_to_parse_exit_code() {
        let err = read_sheet(Path::new("/nonexistent/custodian.xlsx")).unwrap_err();
        assert_eq!(err.code, EXIT_PARSE);
        assert!(err.message.contains("cannot read"));
    }
}
