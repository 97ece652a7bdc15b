//! FILENAME: report-engine/src/lib.rs
//! Hierarchical header compiler and grid-export engine.
//!
//! This crate replaces three near-identical ad-hoc report exporters
//! (category/level summaries, person-time statistics, reimbursement
//! statistics) with one data-driven engine: an arbitrarily nested
//! column specification is compiled into header rows with merged-cell
//! regions, source records are projected into flat rows aligned with
//! the flattened leaves, and an optional summary row aggregates
//! selected leaf columns.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the report IS)
//! - `format`: Display formatting of raw values
//! - `engine`: Header compilation and the export pipeline (HOW we compute)
//! - `project`: Record-to-row projection
//! - `aggregate`: Summary rows and derived columns
//! - `view`: Renderable output for the spreadsheet sink (WHAT we emit)
//!
//! The whole pipeline is pure and synchronous: one call per export
//! action, no shared state, no suspension points.

pub mod aggregate;
pub mod definition;
pub mod engine;
pub mod error;
pub mod format;
pub mod project;
pub mod view;

pub use aggregate::*;
pub use definition::*;
pub use engine::{build_report, compile_header};
pub use error::ReportError;
pub use format::CellFormat;
pub use project::*;
pub use view::*;
