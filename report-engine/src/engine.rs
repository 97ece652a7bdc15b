//! FILENAME: report-engine/src/engine.rs
//! Header Compiler - Flattening a column tree into a header block.
//!
//! This module takes a `ColumnNode` forest and produces the compiled
//! header: N header rows, merge regions, column widths and the
//! canonical leaf order.
//!
//! Algorithm:
//! 1. Validate the forest (fail-fast, before any row is processed)
//! 2. Compute total depth = the deepest leaf's depth + 1
//! 3. Walk depth-first with a column cursor:
//!    - a group's title sits at its own depth and merges horizontally
//!      across its subtree's leaf span
//!    - a leaf's title sits at its own depth and merges vertically down
//!      to the last header row
//! 4. Render the placed cells into rectangular rows, padding with
//!    empty strings under the merges
//!
//! Unbalanced leaf depths (a bare "period" column next to fully
//! expanded category/level groups) are the common case and are handled
//! by the vertical-merge rule, never by inserting blank siblings.

use crate::aggregate::{apply_derived, summarize};
use crate::definition::{validate_columns, ColumnNode, ReportDefinition};
use crate::error::ReportError;
use crate::project::{project_records, SourceRecord};
use crate::view::{assemble, CellValue, CompiledHeader, Grid, HeaderCell, LeafColumn, MergeRegion};

/// Minimum fallback column width, in characters.
const MIN_COL_WIDTH: u16 = 12;

// ============================================================================
// HEADER COMPILATION
// ============================================================================

/// Compiles a column forest into a renderable header block.
///
/// The same forest always compiles to the same output; the compiler is
/// a pure function of its input.
pub fn compile_header(columns: &[ColumnNode]) -> Result<CompiledHeader, ReportError> {
    validate_columns(columns)?;

    // A forest with no columns still yields one (empty) header row so
    // the sink always has a rectangular grid to write.
    if columns.is_empty() {
        return Ok(CompiledHeader {
            header_rows: vec![Vec::new()],
            merges: Vec::new(),
            col_widths: Vec::new(),
            leaf_order: Vec::new(),
        });
    }

    let total_depth = columns
        .iter()
        .map(|node| max_leaf_depth(node, 0))
        .max()
        .unwrap_or(1);

    let mut cells: Vec<HeaderCell> = Vec::new();
    let mut merges: Vec<MergeRegion> = Vec::new();
    let mut leaf_order: Vec<LeafColumn> = Vec::new();
    let mut col = 0;

    for node in columns {
        place_node(node, 0, &mut col, total_depth, &mut cells, &mut merges, &mut leaf_order);
    }

    // Render placed cells into rectangular rows; everything else is a
    // padding cell folded into a merge.
    let leaf_count = col;
    let mut header_rows =
        vec![vec![CellValue::Text(String::new()); leaf_count]; total_depth];
    for cell in &cells {
        header_rows[cell.row][cell.col] = CellValue::Text(cell.text.clone());
    }

    let col_widths = leaf_order
        .iter()
        .zip(collect_width_hints(columns))
        .map(|(leaf, hint)| hint.unwrap_or_else(|| fallback_width(&leaf.title)))
        .collect();

    Ok(CompiledHeader {
        header_rows,
        merges,
        col_widths,
        leaf_order,
    })
}

/// Number of leaf columns under a node.
fn leaf_span(node: &ColumnNode) -> usize {
    if node.is_leaf() {
        1
    } else {
        node.children.iter().map(leaf_span).sum()
    }
}

/// Header row count required by a node's subtree.
fn max_leaf_depth(node: &ColumnNode, depth: usize) -> usize {
    if node.is_leaf() {
        depth + 1
    } else {
        node.children
            .iter()
            .map(|child| max_leaf_depth(child, depth + 1))
            .max()
            .unwrap_or(depth + 1)
    }
}

/// Recursively places one node and its subtree, advancing the column
/// cursor by the node's leaf span.
fn place_node(
    node: &ColumnNode,
    depth: usize,
    col: &mut usize,
    total_depth: usize,
    cells: &mut Vec<HeaderCell>,
    merges: &mut Vec<MergeRegion>,
    leaf_order: &mut Vec<LeafColumn>,
) {
    let start_col = *col;

    cells.push(HeaderCell {
        row: depth,
        col: start_col,
        text: node.title.clone(),
    });

    if node.is_leaf() {
        // A shallow leaf extends down through the remaining header
        // rows; a leaf already on the last row needs no merge.
        if depth + 1 < total_depth {
            merges.push(MergeRegion {
                start_row: depth,
                start_col,
                end_row: total_depth - 1,
                end_col: start_col,
            });
        }

        leaf_order.push(LeafColumn {
            title: node.title.clone(),
            path: node
                .data_path
                .as_deref()
                .unwrap_or_default()
                .split('.')
                .map(str::to_string)
                .collect(),
            format: node.format.clone(),
            default_value: node.default_value.clone(),
        });
        *col += 1;
    } else {
        let span = leaf_span(node);

        // Single-child groups would produce a 1x1 region, which has no
        // visual effect and trips up some sinks; skip it.
        if span > 1 {
            merges.push(MergeRegion {
                start_row: depth,
                start_col,
                end_row: depth,
                end_col: start_col + span - 1,
            });
        }

        for child in &node.children {
            place_node(child, depth + 1, col, total_depth, cells, merges, leaf_order);
        }
    }
}

/// Collects the per-leaf width hints in depth-first order.
fn collect_width_hints(columns: &[ColumnNode]) -> Vec<Option<u16>> {
    fn walk(node: &ColumnNode, out: &mut Vec<Option<u16>>) {
        if node.is_leaf() {
            out.push(node.width_hint);
        } else {
            for child in &node.children {
                walk(child, out);
            }
        }
    }

    let mut hints = Vec::new();
    for node in columns {
        walk(node, &mut hints);
    }
    hints
}

fn fallback_width(title: &str) -> u16 {
    MIN_COL_WIDTH.max((title.chars().count() as u16).saturating_mul(2))
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Runs the full pipeline for one export action:
/// compile -> project -> summarize -> derive -> assemble.
///
/// Every call owns its inputs and returns an independent `Grid`; there
/// is no shared state between exports and the transform is repeatable.
pub fn build_report(
    definition: &ReportDefinition,
    records: &[SourceRecord],
) -> Result<Grid, ReportError> {
    let compiled = compile_header(&definition.columns)?;
    let rows = project_records(&compiled.leaf_order, records);

    let summary_row = match &definition.summary {
        Some(policies) => {
            let mut summary = summarize(&compiled.leaf_order, &rows, policies)?;
            apply_derived(&compiled.leaf_order, &mut summary, &definition.derived)?;
            Some(summary.cells)
        }
        None => None,
    };

    let data_rows = rows.into_iter().map(|row| row.display).collect();
    Ok(assemble(compiled, data_rows, summary_row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SummaryPolicy;
    use crate::format::CellFormat;
    use serde_json::json;

    /// The worked example: a bare "Month" leaf next to a two-leaf group.
    fn example_forest() -> Vec<ColumnNode> {
        vec![
            ColumnNode::leaf("Month", "month"),
            ColumnNode::group(
                "Region A",
                vec![
                    ColumnNode::leaf("count", "a.count"),
                    ColumnNode::leaf("amount", "a.amount").with_format(CellFormat::currency()),
                ],
            ),
        ]
    }

    #[test]
    fn test_example_forest_compiles_to_expected_geometry() {
        let compiled = compile_header(&example_forest()).unwrap();

        assert_eq!(compiled.total_depth(), 2);
        assert_eq!(compiled.leaf_count(), 3);

        // Vertical merge for the shallow "Month" leaf, horizontal merge
        // for the "Region A" group.
        assert_eq!(
            compiled.merges,
            vec![
                MergeRegion { start_row: 0, start_col: 0, end_row: 1, end_col: 0 },
                MergeRegion { start_row: 0, start_col: 1, end_row: 0, end_col: 2 },
            ]
        );

        assert_eq!(
            compiled.header_rows[0],
            vec![
                CellValue::text("Month"),
                CellValue::text("Region A"),
                CellValue::text(""),
            ]
        );
        assert_eq!(
            compiled.header_rows[1],
            vec![
                CellValue::text(""),
                CellValue::text("count"),
                CellValue::text("amount"),
            ]
        );
    }

    #[test]
    fn test_leaf_count_invariant() {
        let compiled = compile_header(&example_forest()).unwrap();
        let span_total: usize = example_forest().iter().map(leaf_span).sum();

        assert_eq!(span_total, compiled.leaf_order.len());
        assert_eq!(compiled.col_widths.len(), compiled.leaf_order.len());
        for row in &compiled.header_rows {
            assert_eq!(row.len(), compiled.leaf_order.len());
        }
    }

    #[test]
    fn test_merge_tiling_invariant() {
        // Three-level, unbalanced forest: merges plus unmerged single
        // cells must cover every header cell exactly once.
        let forest = vec![
            ColumnNode::leaf("Period", "period"),
            ColumnNode::group(
                "District",
                vec![
                    ColumnNode::group(
                        "Category A",
                        vec![
                            ColumnNode::leaf("count", "d.a.count"),
                            ColumnNode::leaf("amount", "d.a.amount"),
                        ],
                    ),
                    ColumnNode::leaf("subtotal", "d.subtotal"),
                ],
            ),
        ];
        let compiled = compile_header(&forest).unwrap();

        let rows = compiled.total_depth();
        let cols = compiled.leaf_count();
        let mut covered = vec![vec![0usize; cols]; rows];

        for merge in &compiled.merges {
            assert!(!merge.is_degenerate());
            for row in merge.start_row..=merge.end_row {
                for col in merge.start_col..=merge.end_col {
                    covered[row][col] += 1;
                }
            }
        }

        // No overlaps between regions.
        for row in &covered {
            for &count in row {
                assert!(count <= 1, "overlapping merge regions");
            }
        }

        // Unmerged singles fill the rest: every cell covered exactly once.
        for row in covered.iter_mut() {
            for count in row.iter_mut() {
                if *count == 0 {
                    *count = 1;
                }
            }
        }
        assert!(covered.iter().flatten().all(|&count| count == 1));
    }

    #[test]
    fn test_unbalanced_depths_use_vertical_merges() {
        // Depth-1 leaf beside a depth-3 subtree.
        let forest = vec![
            ColumnNode::leaf("Name", "name"),
            ColumnNode::group(
                "Outer",
                vec![ColumnNode::group(
                    "Inner",
                    vec![ColumnNode::leaf("value", "outer.inner.value")],
                )],
            ),
        ];
        let compiled = compile_header(&forest).unwrap();

        assert_eq!(compiled.total_depth(), 3);
        // "Name" spans all three header rows at column 0.
        assert!(compiled.merges.contains(&MergeRegion {
            start_row: 0,
            start_col: 0,
            end_row: 2,
            end_col: 0,
        }));
        // "value" already sits on the last header row, so it needs no
        // vertical merge; the single-child groups above it span 1 and
        // emit none either.
        assert!(!compiled.merges.iter().any(|m| m.start_col == 1));
    }

    #[test]
    fn test_single_child_group_emits_no_degenerate_merge() {
        let forest = vec![ColumnNode::group(
            "Only",
            vec![ColumnNode::leaf("value", "value")],
        )];
        let compiled = compile_header(&forest).unwrap();
        assert!(compiled.merges.iter().all(|m| !m.is_degenerate()));
    }

    #[test]
    fn test_empty_forest_yields_single_empty_header_row() {
        let compiled = compile_header(&[]).unwrap();
        assert_eq!(compiled.header_rows, vec![Vec::new()]);
        assert!(compiled.merges.is_empty());
        assert!(compiled.leaf_order.is_empty());
        assert!(compiled.col_widths.is_empty());
    }

    #[test]
    fn test_width_hints_and_fallback() {
        let forest = vec![
            ColumnNode::leaf("ID", "id").with_width(30),
            ColumnNode::leaf("District Name Very Long", "district"),
            ColumnNode::leaf("x", "x"),
        ];
        let compiled = compile_header(&forest).unwrap();

        assert_eq!(compiled.col_widths[0], 30);
        // Fallback: max(12, 2 * title chars).
        assert_eq!(compiled.col_widths[1], 46);
        assert_eq!(compiled.col_widths[2], 12);
    }

    #[test]
    fn test_compile_is_idempotent() {
        let forest = example_forest();
        let first = compile_header(&forest).unwrap();
        let second = compile_header(&forest).unwrap();

        assert_eq!(first.header_rows, second.header_rows);
        assert_eq!(first.merges, second.merges);
        assert_eq!(first.col_widths, second.col_widths);
    }

    #[test]
    fn test_invalid_spec_fails_before_any_row_is_processed() {
        let mut bad = ColumnNode::group("Region", vec![ColumnNode::leaf("count", "a.count")]);
        bad.data_path = Some("a".to_string());

        assert!(matches!(
            compile_header(&[bad]),
            Err(ReportError::InvalidColumnSpec(_))
        ));
    }

    #[test]
    fn test_build_report_end_to_end() {
        let definition = ReportDefinition::new("MonthlySummary", example_forest()).with_summary(vec![
            SummaryPolicy::Label("Total".to_string()),
            SummaryPolicy::Sum,
            SummaryPolicy::Sum,
        ]);

        let records = vec![
            json!({"month": "2024-01", "a": {"count": 5, "amount": 1000}}),
            json!({"month": "2024-02", "a": {"count": 3, "amount": 500}}),
        ];

        let grid = build_report(&definition, &records).unwrap();

        assert_eq!(grid.header_rows.len(), 2);
        assert_eq!(grid.data_rows.len(), 3); // 2 data + 1 summary
        assert_eq!(
            grid.data_rows[0],
            vec![
                CellValue::text("2024-01"),
                CellValue::Number(5.0),
                CellValue::text("¥1000.00"),
            ]
        );
        assert_eq!(
            grid.data_rows[2],
            vec![
                CellValue::text("Total"),
                CellValue::Number(8.0),
                CellValue::text("¥1500.00"),
            ]
        );
        assert_eq!(grid.col_count(), 3);
    }

    #[test]
    fn test_build_report_without_summary() {
        let definition = ReportDefinition::new("Plain", example_forest());
        let grid = build_report(&definition, &[json!({"month": "2024-01"})]).unwrap();
        assert_eq!(grid.data_rows.len(), 1);
    }
}
