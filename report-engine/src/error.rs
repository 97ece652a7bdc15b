//! FILENAME: report-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid column spec: {0}")]
    InvalidColumnSpec(String),

    #[error("Cannot sum non-numeric value in column {column} (\"{title}\"): found {found}")]
    AggregationTypeMismatch {
        column: usize,
        title: String,
        found: &'static str,
    },

    #[error("Summary policy count {policies} does not match leaf count {leaves}")]
    PolicyLengthMismatch { policies: usize, leaves: usize },

    #[error("Derived column index {index} is out of range for {leaves} leaf columns")]
    DerivedIndexOutOfRange { index: usize, leaves: usize },

    #[error("Derived column references leaf {index} which has no summed total")]
    DerivedSourceNotSummed { index: usize },
}
