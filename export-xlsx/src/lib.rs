//! FILENAME: export-xlsx/src/lib.rs
//! Spreadsheet sink for compiled report grids.
//!
//! Consumes a finished `Grid` (header rows + data rows + merge regions
//! + column widths) from `report-engine` and serializes it to a
//! single-sheet `.xlsx` file. The engine stays pure; all bytes-on-disk
//! concerns live here, and a failed write leaves the grid untouched so
//! the caller can simply retry the export.

pub mod error;
pub mod xlsx_writer;

pub use error::ExportError;
pub use xlsx_writer::{export_file_name, save_grid, ExportOptions};
