//! `posrecon-engine` — pairwise position reconciliation.
//!
//! Pure engine crate: receives parsed tables, returns discrepancy reports.
//! No CLI or IO dependencies.

pub mod assets;
pub mod config;
pub mod differ;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod table;

pub use config::ReconConfig;
pub use differ::{diff_custodian_brokerage, diff_latin_custodian, diff_transfers_conversions};
pub use error::EngineError;
pub use model::{Discrepancy, DiscrepancyReport};
pub use table::{Cell, Table, Workbook};
