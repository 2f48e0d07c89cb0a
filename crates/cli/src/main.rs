// posrecon - pairwise position reconciliation across back-office exports

mod exit_codes;
mod ops;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "posrecon")]
#[command(about = "Pairwise position reconciliation across back-office exports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latin export vs custodian export (both spreadsheets)
    #[command(after_help = "\
Examples:
  posrecon latin-custodian latin.xlsx custodian.xlsx
  posrecon latin-custodian latin.xlsx custodian.xlsx --json
  posrecon latin-custodian latin.xlsx custodian.xlsx --output report.json")]
    LatinCustodian {
        /// Latin positions spreadsheet
        latin: PathBuf,
        /// Custodian positions spreadsheet
        custodian: PathBuf,
        #[command(flatten)]
        opts: OutputOpts,
    },

    /// Custodian export vs brokerage delimited export
    #[command(after_help = "\
Examples:
  posrecon custodian-brokerage brokerage.csv custodian.xlsx --json")]
    CustodianBrokerage {
        /// Brokerage delimited export (disclaimer line + header row)
        brokerage: PathBuf,
        /// Custodian positions spreadsheet
        custodian: PathBuf,
        #[command(flatten)]
        opts: OutputOpts,
    },

    /// Transfer sheets vs conversions ledger
    #[command(after_help = "\
Examples:
  posrecon transfers transactions.xlsx conversions.csv --json")]
    Transfers {
        /// Transactions workbook holding the Position Transfer sheets
        transactions: PathBuf,
        /// Conversions ledger (delimiter auto-detected)
        conversions: PathBuf,
        #[command(flatten)]
        opts: OutputOpts,
    },
}

#[derive(Args)]
struct OutputOpts {
    /// Output JSON to stdout instead of just the summary
    #[arg(long)]
    json: bool,

    /// Write JSON output to file
    #[arg(long)]
    output: Option<PathBuf>,

    /// TOML file overriding layout windows, columns, or aggregation policy
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug)]
pub(crate) struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match ops::run(cli.command) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}
