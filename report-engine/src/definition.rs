//! FILENAME: report-engine/src/definition.rs
//! Report Definition - The serializable column specification.
//!
//! This module contains all the types needed to DESCRIBE a report:
//! the nested column tree and the optional summary/derived-column
//! configuration. These structures are designed to be:
//! - Serializable (report shapes are data, not code)
//! - Immutable snapshots of caller intent
//!
//! The three historical report variants (2-level, 3-level and
//! mixed-depth column layouts) are all expressed as `ColumnNode`
//! forests; nothing here is specific to any one of them.

use serde::{Deserialize, Serialize};

use crate::aggregate::{DerivedColumn, SummaryPolicy};
use crate::error::ReportError;
use crate::format::CellFormat;
use crate::view::CellValue;

/// Index into the flattened leaf order (0-based).
pub type LeafIndex = usize;

// ============================================================================
// COLUMN TREE
// ============================================================================

/// One column or column-group in the header tree.
///
/// A node is either a pure leaf (`data_path` set, no children) or a
/// pure group (`children` set, no `data_path`/`format`). Mixed nodes
/// are rejected by `validate_columns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnNode {
    /// Display label, shown verbatim in the header cell.
    pub title: String,

    /// Child columns; empty means this node is a leaf.
    #[serde(default)]
    pub children: Vec<ColumnNode>,

    /// Dot-separated lookup path into the source record (leaves only).
    /// Segments may be dynamic keys decided at runtime, e.g.
    /// `"categories.Category-A.levels.Level-1.count"`.
    #[serde(default)]
    pub data_path: Option<String>,

    /// Display formatter applied after path resolution (leaves only).
    #[serde(default)]
    pub format: Option<CellFormat>,

    /// Value used when `data_path` resolves to nothing.
    #[serde(default = "default_cell_value")]
    pub default_value: CellValue,

    /// Advisory character width for the destination column.
    #[serde(default)]
    pub width_hint: Option<u16>,
}

fn default_cell_value() -> CellValue {
    CellValue::Number(0.0)
}

impl ColumnNode {
    /// Creates a leaf column bound to a record path.
    pub fn leaf(title: impl Into<String>, data_path: impl Into<String>) -> Self {
        ColumnNode {
            title: title.into(),
            children: Vec::new(),
            data_path: Some(data_path.into()),
            format: None,
            default_value: default_cell_value(),
            width_hint: None,
        }
    }

    /// Creates a group column spanning its children.
    pub fn group(title: impl Into<String>, children: Vec<ColumnNode>) -> Self {
        ColumnNode {
            title: title.into(),
            children,
            data_path: None,
            format: None,
            default_value: default_cell_value(),
            width_hint: None,
        }
    }

    pub fn with_format(mut self, format: CellFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_default(mut self, value: CellValue) -> Self {
        self.default_value = value;
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width_hint = Some(width);
        self
    }

    /// A node with no children is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Validates a column forest, fail-fast, before any row is processed.
/// Header correctness cannot be guaranteed over invalid input, so this
/// runs at the top of compilation rather than lazily.
pub fn validate_columns(columns: &[ColumnNode]) -> Result<(), ReportError> {
    for node in columns {
        validate_node(node)?;
    }
    Ok(())
}

fn validate_node(node: &ColumnNode) -> Result<(), ReportError> {
    if node.title.is_empty() {
        return Err(ReportError::InvalidColumnSpec(
            "column title must not be empty".to_string(),
        ));
    }

    if node.is_leaf() {
        match &node.data_path {
            Some(path) if !path.is_empty() => Ok(()),
            Some(_) => Err(ReportError::InvalidColumnSpec(format!(
                "leaf \"{}\" has an empty data path",
                node.title
            ))),
            None => Err(ReportError::InvalidColumnSpec(format!(
                "leaf \"{}\" is missing a data path",
                node.title
            ))),
        }
    } else {
        if node.data_path.is_some() {
            return Err(ReportError::InvalidColumnSpec(format!(
                "group \"{}\" must not carry a data path",
                node.title
            )));
        }
        if node.format.is_some() {
            return Err(ReportError::InvalidColumnSpec(format!(
                "group \"{}\" must not carry a formatter",
                node.title
            )));
        }
        for child in &node.children {
            validate_node(child)?;
        }
        Ok(())
    }
}

// ============================================================================
// REPORT DEFINITION
// ============================================================================

/// The complete, serializable definition of one report export.
/// This is the "source of truth" a caller hands to `build_report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDefinition {
    /// Report name; also used for the export filename.
    pub name: String,

    /// The column forest, outer groups first.
    pub columns: Vec<ColumnNode>,

    /// Per-leaf summary policies, in leaf order. `None` disables the
    /// summary row entirely.
    #[serde(default)]
    pub summary: Option<Vec<SummaryPolicy>>,

    /// Derived columns computed after aggregation (e.g. ratio columns
    /// whose totals are not additive).
    #[serde(default)]
    pub derived: Vec<DerivedColumn>,
}

impl ReportDefinition {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnNode>) -> Self {
        ReportDefinition {
            name: name.into(),
            columns,
            summary: None,
            derived: Vec::new(),
        }
    }

    pub fn with_summary(mut self, policies: Vec<SummaryPolicy>) -> Self {
        self.summary = Some(policies);
        self
    }

    pub fn with_derived(mut self, derived: Vec<DerivedColumn>) -> Self {
        self.derived = derived;
        self
    }
}
