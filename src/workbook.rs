/*!
 * Workbook loading and saving.
 *
 * The loader turns an xlsx file into the in-memory `Document` model with
 * every cell tagged once. The saver re-opens the original workbook, patches
 * only the text cells recorded in the document, and writes the result -
 * styles, merges, dimensions, formulas, numeric values and validation rules
 * survive untouched because they are never regenerated.
 */

use std::path::Path;

use log::{debug, info};

use crate::document::classifier::{classify, Classification};
use crate::document::model::{CellValue, Document, Sheet};
use crate::errors::DocumentError;

/// Extensions accepted by the loader
const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm"];

/// Whether the path looks like a workbook this application can process
pub fn is_workbook_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
        .unwrap_or(false)
}

/// Load a workbook file into the document model.
///
/// Cells are tagged exactly once here; the tag never changes afterwards.
/// Formulas keep their `=` prefix, numeric cells keep their raw display
/// string, booleans land in `Other`.
pub fn load_document(path: &Path) -> Result<Document, DocumentError> {
    if !path.exists() {
        return Err(DocumentError::UnreadableFile(path.display().to_string()));
    }
    if !is_workbook_file(path) {
        return Err(DocumentError::UnsupportedFormat(path.display().to_string()));
    }

    let book = umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|e| DocumentError::Corrupted(format!("{}: {}", path.display(), e)))?;

    let mut document = Document::with_source(path);

    for worksheet in book.get_sheet_collection() {
        let mut sheet = Sheet::new(worksheet.get_name());

        for cell in worksheet.get_cell_collection() {
            let coordinate = cell.get_coordinate();
            let row = *coordinate.get_row_num();
            let col = *coordinate.get_col_num();

            let value = if cell.is_formula() {
                let formula = cell.get_formula();
                if formula.starts_with('=') {
                    CellValue::Formula(formula.to_string())
                } else {
                    CellValue::Formula(format!("={}", formula))
                }
            } else {
                tag_raw_value(cell.get_value().to_string())
            };

            if value == CellValue::Empty {
                continue;
            }
            sheet.set_cell(row, col, value);
        }

        sheet.meta.merge_ranges = worksheet
            .get_merge_cells()
            .iter()
            .map(|range| range.get_range())
            .collect();
        sheet.meta.max_row = sheet.meta.max_row.max(worksheet.get_highest_row());
        sheet.meta.max_col = sheet.meta.max_col.max(worksheet.get_highest_column());

        debug!(
            "Loaded sheet '{}': {} populated cells, {} merge ranges",
            sheet.name,
            sheet.populated_cells(),
            sheet.meta.merge_ranges.len()
        );
        document.push_sheet(sheet);
    }

    info!(
        "Loaded workbook {} ({} sheets, {} cells)",
        path.display(),
        document.sheets.len(),
        document.total_cells()
    );
    Ok(document)
}

/// Assign the initial tag for a non-formula raw value
fn tag_raw_value(raw: String) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if trimmed.parse::<f64>().is_ok() {
        return CellValue::Numeric(raw);
    }
    if trimmed == "TRUE" || trimmed == "FALSE" {
        return CellValue::Other(raw);
    }
    CellValue::Text(raw)
}

/// Save a document by patching its backing workbook.
///
/// The original file is re-read, every text cell recorded in the document is
/// written back at its address, and the patched workbook is staged to a
/// temporary file before being moved into place, so a failed write never
/// leaves a half-written output.
pub fn save_document(document: &Document, output_path: &Path) -> Result<(), DocumentError> {
    let source = document
        .source_path
        .as_deref()
        .ok_or(DocumentError::NoBackingWorkbook)?;

    let mut book = umya_spreadsheet::reader::xlsx::read(source)
        .map_err(|e| DocumentError::Corrupted(format!("{}: {}", source.display(), e)))?;

    let mut patched = 0usize;
    for sheet in &document.sheets {
        let worksheet = book
            .get_sheet_by_name_mut(&sheet.name)
            .ok_or_else(|| {
                DocumentError::Corrupted(format!(
                    "sheet '{}' missing from backing workbook",
                    sheet.name
                ))
            })?;

        for (row, col, value) in sheet.iter() {
            if let CellValue::Text(text) = value {
                worksheet.get_cell_mut((col, row)).set_value_string(text.as_str());
                patched += 1;
            }
        }
    }

    let parent = output_path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        std::fs::create_dir_all(dir)
            .map_err(|e| DocumentError::from_io(&e, &dir.display().to_string()))?;
    }

    let staging = tempfile::Builder::new()
        .prefix(".xlation-")
        .suffix(".xlsx")
        .tempfile_in(parent.unwrap_or_else(|| Path::new(".")))
        .map_err(|e| DocumentError::from_io(&e, &output_path.display().to_string()))?;

    umya_spreadsheet::writer::xlsx::write(&book, staging.path())
        .map_err(|e| DocumentError::Io(format!("{}: {}", staging.path().display(), e)))?;

    staging
        .persist(output_path)
        .map_err(|e| DocumentError::from_io(&e.error, &output_path.display().to_string()))?;

    info!(
        "Saved workbook {} ({} text cells written)",
        output_path.display(),
        patched
    );
    Ok(())
}

/// Per-sheet content counts, for logs and the inspect command
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSummary {
    /// Worksheet name
    pub name: String,
    /// Cells with any stored content
    pub populated_cells: usize,
    /// Cells the classifier marks Translatable
    pub translatable_cells: usize,
    /// Highest populated row
    pub max_row: u32,
    /// Highest populated column
    pub max_col: u32,
}

/// Summarize every sheet of a document
pub fn sheet_summaries(document: &Document) -> Vec<SheetSummary> {
    document
        .sheets
        .iter()
        .map(|sheet| {
            let translatable = sheet
                .iter()
                .filter(|(_, _, value)| classify(value) == Classification::Translatable)
                .count();
            SheetSummary {
                name: sheet.name.clone(),
                populated_cells: sheet.populated_cells(),
                translatable_cells: translatable,
                max_row: sheet.meta.max_row,
                max_col: sheet.meta.max_col,
            }
        })
        .collect()
}
