//! FILENAME: report-engine/src/view.rs
//! Report View - The renderable output of the engine.
//!
//! This module contains everything the downstream spreadsheet sink
//! consumes: the compiled header block (rows, merge regions, column
//! widths, leaf order) and the final assembled `Grid`. These types are
//! deliberately dumb; all computation lives in `engine`, `project` and
//! `aggregate`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::format::CellFormat;

// ============================================================================
// CELL VALUE
// ============================================================================

/// A single output cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Returns the numeric value, if this cell holds one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Short type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "text",
            CellValue::Boolean(_) => "boolean",
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

// ============================================================================
// HEADER GEOMETRY
// ============================================================================

/// One placed header cell: a node title at its grid position.
/// Padding cells under merges are not represented here; they are
/// materialized as empty strings when the header rows are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderCell {
    pub row: usize,
    pub col: usize,
    pub text: String,
}

/// A rectangular range of cells combined into one visual cell.
/// Bounds are inclusive and 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRegion {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl MergeRegion {
    /// A 1x1 region has no visual effect and upsets some sinks.
    pub fn is_degenerate(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    pub fn cell_count(&self) -> usize {
        (self.end_row - self.start_row + 1) * (self.end_col - self.start_col + 1)
    }
}

// ============================================================================
// LEAF ORDER
// ============================================================================

/// A flattened leaf column in canonical (depth-first, source) order.
/// Carries everything projection and aggregation need, with the dot
/// path pre-split so per-record lookups don't re-parse it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafColumn {
    /// Display title of the leaf (used in error messages and width fallback).
    pub title: String,

    /// Pre-split `data_path` segments, in lookup order.
    pub path: SmallVec<[String; 4]>,

    /// Display formatter, if any.
    pub format: Option<CellFormat>,

    /// Value used when the path resolves to nothing.
    pub default_value: CellValue,
}

// ============================================================================
// COMPILED HEADER
// ============================================================================

/// The output of header compilation: everything needed to render the
/// header block and to keep data rows aligned under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledHeader {
    /// Rendered header rows; padding cells are empty strings.
    pub header_rows: Vec<Vec<CellValue>>,

    /// Merge regions for the header block. Never degenerate, never
    /// overlapping; together with unmerged single cells they tile the
    /// header block exactly.
    pub merges: Vec<MergeRegion>,

    /// Advisory character width per leaf column.
    pub col_widths: Vec<u16>,

    /// Depth-first leaf columns; the canonical column order.
    pub leaf_order: Vec<LeafColumn>,
}

impl CompiledHeader {
    /// Number of header rows.
    pub fn total_depth(&self) -> usize {
        self.header_rows.len()
    }

    /// Number of leaf columns.
    pub fn leaf_count(&self) -> usize {
        self.leaf_order.len()
    }
}

// ============================================================================
// GRID
// ============================================================================

/// The finished rectangular grid handed to the spreadsheet sink.
/// Built once per export action, consumed immediately, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    /// Header rows, including padding cells.
    pub header_rows: Vec<Vec<CellValue>>,

    /// Projected data rows, plus the summary row (if any) as the last row.
    pub data_rows: Vec<Vec<CellValue>>,

    /// Merge regions (header block only; the data region is never merged).
    pub merges: Vec<MergeRegion>,

    /// Advisory character width per column.
    pub col_widths: Vec<u16>,
}

impl Grid {
    pub fn row_count(&self) -> usize {
        self.header_rows.len() + self.data_rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_widths.len()
    }
}

/// Assembles the final grid. Pure concatenation: the summary row, when
/// present, becomes the last data row (the sink distinguishes it
/// visually; no merges are added for the data region).
pub fn assemble(
    header: CompiledHeader,
    data_rows: Vec<Vec<CellValue>>,
    summary_row: Option<Vec<CellValue>>,
) -> Grid {
    let mut data_rows = data_rows;
    if let Some(summary) = summary_row {
        data_rows.push(summary);
    }

    Grid {
        header_rows: header.header_rows,
        data_rows,
        merges: header.merges,
        col_widths: header.col_widths,
    }
}
