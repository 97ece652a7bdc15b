//! FILENAME: report-engine/src/aggregate.rs
//! Aggregation - Summary rows and derived columns.
//!
//! Summation always runs on RAW values: formatted output (currency,
//! percentages) is not re-parseable, and percentages in particular are
//! never additive. Ratio-style columns are therefore not summed at
//! all; they are derived from other leaves' raw totals in an explicit
//! post-processing step after `summarize`.

use serde::{Deserialize, Serialize};

use crate::definition::LeafIndex;
use crate::error::ReportError;
use crate::project::ProjectedRow;
use crate::view::{CellValue, LeafColumn};

// ============================================================================
// POLICIES
// ============================================================================

/// What the summary row shows for one leaf column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SummaryPolicy {
    /// Sum the raw numeric values, then format the total once.
    Sum,
    /// A fixed label, e.g. "Total" under a name column.
    Label(String),
    /// An empty cell.
    Blank,
}

/// A column whose summary value is computed from other leaves' raw
/// totals rather than summed directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedColumn {
    /// The leaf whose summary cell is overwritten.
    pub target: LeafIndex,

    /// How the value is computed.
    pub formula: DerivedFormula,
}

/// Formulas for derived columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DerivedFormula {
    /// numerator total / denominator total (e.g. reimbursed / eligible).
    Ratio {
        numerator: LeafIndex,
        denominator: LeafIndex,
    },
}

// ============================================================================
// SUMMARY ROW
// ============================================================================

/// The computed summary row plus the raw totals behind it.
/// Raw totals are retained per summed leaf so derived columns can be
/// computed without re-walking the data rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Display cells, in leaf order.
    pub cells: Vec<CellValue>,

    /// Raw totals for `Sum` leaves; `None` elsewhere.
    pub raw_totals: Vec<Option<f64>>,
}

/// Computes the summary row over projected rows.
///
/// `policies` must supply exactly one policy per leaf. Summing a
/// non-numeric raw value is a caller error and surfaces as
/// `AggregationTypeMismatch`; a silently-wrong total is worse than a
/// visible failure. Empty raw cells count as 0.
pub fn summarize(
    leaf_order: &[LeafColumn],
    rows: &[ProjectedRow],
    policies: &[SummaryPolicy],
) -> Result<SummaryRow, ReportError> {
    if policies.len() != leaf_order.len() {
        return Err(ReportError::PolicyLengthMismatch {
            policies: policies.len(),
            leaves: leaf_order.len(),
        });
    }

    let mut cells = Vec::with_capacity(leaf_order.len());
    let mut raw_totals = vec![None; leaf_order.len()];

    for (index, policy) in policies.iter().enumerate() {
        match policy {
            SummaryPolicy::Sum => {
                let mut total = 0.0;
                for row in rows {
                    match &row.raw[index] {
                        CellValue::Number(n) => total += n,
                        CellValue::Empty => {}
                        other => {
                            return Err(ReportError::AggregationTypeMismatch {
                                column: index,
                                title: leaf_order[index].title.clone(),
                                found: other.type_name(),
                            })
                        }
                    }
                }
                raw_totals[index] = Some(total);
                cells.push(format_leaf(&leaf_order[index], total));
            }
            SummaryPolicy::Label(text) => cells.push(CellValue::Text(text.clone())),
            SummaryPolicy::Blank => cells.push(CellValue::Empty),
        }
    }

    Ok(SummaryRow { cells, raw_totals })
}

/// Overwrites derived summary cells from other leaves' raw totals.
///
/// A zero denominator degrades to the target leaf's default value, the
/// same tolerance projection applies to sparse data.
pub fn apply_derived(
    leaf_order: &[LeafColumn],
    summary: &mut SummaryRow,
    derived: &[DerivedColumn],
) -> Result<(), ReportError> {
    let leaves = leaf_order.len();

    for column in derived {
        if column.target >= leaves {
            return Err(ReportError::DerivedIndexOutOfRange {
                index: column.target,
                leaves,
            });
        }

        match column.formula {
            DerivedFormula::Ratio {
                numerator,
                denominator,
            } => {
                let num = summed_total(summary, numerator, leaves)?;
                let den = summed_total(summary, denominator, leaves)?;

                let leaf = &leaf_order[column.target];
                summary.cells[column.target] = if den == 0.0 {
                    match &leaf.format {
                        Some(format) => format.apply(&leaf.default_value),
                        None => leaf.default_value.clone(),
                    }
                } else {
                    let ratio = num / den;
                    summary.raw_totals[column.target] = Some(ratio);
                    format_leaf(leaf, ratio)
                };
            }
        }
    }

    Ok(())
}

fn summed_total(summary: &SummaryRow, index: LeafIndex, leaves: usize) -> Result<f64, ReportError> {
    if index >= leaves {
        return Err(ReportError::DerivedIndexOutOfRange { index, leaves });
    }
    summary.raw_totals[index].ok_or(ReportError::DerivedSourceNotSummed { index })
}

fn format_leaf(leaf: &LeafColumn, total: f64) -> CellValue {
    match &leaf.format {
        Some(format) => format.apply(&CellValue::Number(total)),
        None => CellValue::Number(total),
    }
}
