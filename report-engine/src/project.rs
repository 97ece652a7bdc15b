//! FILENAME: report-engine/src/project.rs
//! Row Projection - Flattening nested source records into grid rows.
//!
//! A source record is an opaque nested mapping (`serde_json::Value`)
//! whose keys are often decided at runtime (category and level names
//! arrive as live map keys, not a fixed schema). The projector only
//! ever walks it by dot-path lookup, so the engine stays
//! schema-agnostic.
//!
//! Missing path segments are NOT errors: sparse data is the normal
//! case (a district simply has no entries in some category that
//! month), and the leaf's default value keeps the row aligned under
//! the compiled header.

use serde::{Deserialize, Serialize};

use crate::view::{CellValue, LeafColumn};

/// An opaque nested record consumed only through path lookups.
pub type SourceRecord = serde_json::Value;

/// One projected row, in leaf order.
///
/// Both vectors are always exactly as long as the leaf order. The raw
/// vector feeds aggregation (formatters like currency and percentage
/// are not re-parseable); the display vector goes into the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedRow {
    /// Pre-format values, for aggregation.
    pub raw: Vec<CellValue>,

    /// Post-format values, for display.
    pub display: Vec<CellValue>,
}

/// Projects one record into one flat row aligned to the leaf order.
pub fn project_record(leaf_order: &[LeafColumn], record: &SourceRecord) -> ProjectedRow {
    let mut raw = Vec::with_capacity(leaf_order.len());
    let mut display = Vec::with_capacity(leaf_order.len());

    for leaf in leaf_order {
        let value = resolve_path(record, &leaf.path).unwrap_or_else(|| leaf.default_value.clone());
        let shown = match &leaf.format {
            Some(format) => format.apply(&value),
            None => value.clone(),
        };
        raw.push(value);
        display.push(shown);
    }

    ProjectedRow { raw, display }
}

/// Projects a batch of records, preserving input order.
pub fn project_records(leaf_order: &[LeafColumn], records: &[SourceRecord]) -> Vec<ProjectedRow> {
    records
        .iter()
        .map(|record| project_record(leaf_order, record))
        .collect()
}

/// Resolves pre-split path segments by sequential key lookup.
/// Returns None as soon as any segment is absent, or when the
/// terminal value is not a scalar.
fn resolve_path(record: &SourceRecord, segments: &[String]) -> Option<CellValue> {
    let mut current = record;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    scalar_to_cell(current)
}

fn scalar_to_cell(value: &serde_json::Value) -> Option<CellValue> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Number(n) => n.as_f64().map(CellValue::Number),
        serde_json::Value::String(s) => Some(CellValue::Text(s.clone())),
        serde_json::Value::Bool(b) => Some(CellValue::Boolean(*b)),
        // A path stopping at a non-scalar is treated as unresolved.
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
    }
}
