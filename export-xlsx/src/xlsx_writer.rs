//! FILENAME: export-xlsx/src/xlsx_writer.rs

use report_engine::{CellValue, Grid, MergeRegion};
use rust_xlsxwriter::{Format, FormatAlign, Workbook as XlsxWorkbook};
use std::path::Path;

use crate::ExportError;

/// Sink-side presentation options. The grid itself carries no styling;
/// headers and the summary row are distinguished here.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Worksheet name.
    pub sheet_name: String,

    /// Bold the last data row (the summary row, when the caller
    /// assembled one).
    pub bold_summary_row: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            sheet_name: "Sheet1".to_string(),
            bold_summary_row: false,
        }
    }
}

/// Writes a compiled grid to a single-sheet xlsx file.
pub fn save_grid(grid: &Grid, options: &ExportOptions, path: &Path) -> Result<(), ExportError> {
    log::debug!(
        "writing {}x{} grid ({} merges) to {}",
        grid.row_count(),
        grid.col_count(),
        grid.merges.len(),
        path.display()
    );

    let mut xlsx = XlsxWorkbook::new();
    let worksheet = xlsx.add_worksheet();
    worksheet.set_name(&options.sheet_name)?;

    for (col, width) in grid.col_widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width as f64)?;
    }

    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    // Merged header regions are written as a unit; the cells they
    // cover must not be written individually.
    for merge in &grid.merges {
        let text = header_text(grid, merge.start_row, merge.start_col);
        worksheet.merge_range(
            merge.start_row as u32,
            merge.start_col as u16,
            merge.end_row as u32,
            merge.end_col as u16,
            text,
            &header_format,
        )?;
    }

    for (row, cells) in grid.header_rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            if is_merged(&grid.merges, row, col) {
                continue;
            }
            write_cell(worksheet, row as u32, col as u16, cell, Some(&header_format))?;
        }
    }

    let summary_format = Format::new().set_bold();
    let base_row = grid.header_rows.len();

    for (index, cells) in grid.data_rows.iter().enumerate() {
        let is_summary = options.bold_summary_row && index + 1 == grid.data_rows.len();
        let format = if is_summary { Some(&summary_format) } else { None };

        for (col, cell) in cells.iter().enumerate() {
            write_cell(worksheet, (base_row + index) as u32, col as u16, cell, format)?;
        }
    }

    xlsx.save(path)?;
    Ok(())
}

/// The observed download-name convention: `<ReportName>_<YYYYMMDD>.xlsx`.
pub fn export_file_name(report_name: &str) -> String {
    format!(
        "{}_{}.xlsx",
        report_name,
        chrono::Local::now().format("%Y%m%d")
    )
}

fn header_text(grid: &Grid, row: usize, col: usize) -> &str {
    match grid.header_rows.get(row).and_then(|cells| cells.get(col)) {
        Some(CellValue::Text(s)) => s,
        _ => "",
    }
}

fn is_merged(merges: &[MergeRegion], row: usize, col: usize) -> bool {
    merges.iter().any(|merge| merge.contains(row, col))
}

fn write_cell(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: Option<&Format>,
) -> Result<(), ExportError> {
    match cell {
        CellValue::Empty => {
            // Blank cells still need the format so summary shading and
            // header fills stay continuous.
            if let Some(fmt) = format {
                worksheet.write_blank(row, col, fmt)?;
            }
        }
        CellValue::Number(n) => {
            if let Some(fmt) = format {
                worksheet.write_number_with_format(row, col, *n, fmt)?;
            } else {
                worksheet.write_number(row, col, *n)?;
            }
        }
        CellValue::Text(s) => {
            if let Some(fmt) = format {
                worksheet.write_string_with_format(row, col, s, fmt)?;
            } else {
                worksheet.write_string(row, col, s)?;
            }
        }
        CellValue::Boolean(b) => {
            if let Some(fmt) = format {
                worksheet.write_boolean_with_format(row, col, *b, fmt)?;
            } else {
                worksheet.write_boolean(row, col, *b)?;
            }
        }
    }
    Ok(())
}
