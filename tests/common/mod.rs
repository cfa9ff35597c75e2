/*!
 * Common test utilities shared by unit and integration tests.
 */

#![allow(dead_code)]

use xlation::document::model::{CellValue, Document, Sheet};

/// A single-sheet document with the given texts in column A
pub fn document_with_texts(texts: &[&str]) -> Document {
    let mut sheet = Sheet::new("Sheet1");
    for (i, text) in texts.iter().enumerate() {
        sheet.set_cell(i as u32 + 1, 1, CellValue::Text(text.to_string()));
    }
    let mut document = Document::new();
    document.push_sheet(sheet);
    document
}

/// The three-sheet workbook from the acceptance scenario: Sheet1 holds a
/// text cell, a formula and a number; the other sheets are empty.
pub fn three_sheet_document() -> Document {
    let mut document = Document::new();

    let mut sheet1 = Sheet::new("Sheet1");
    sheet1.set_cell(1, 1, CellValue::Text("Hello".to_string()));
    sheet1.set_cell(2, 1, CellValue::Formula("=SUM(B1:B2)".to_string()));
    sheet1.set_cell(3, 1, CellValue::Numeric("42".to_string()));
    document.push_sheet(sheet1);

    document.push_sheet(Sheet::new("Sheet2"));
    document.push_sheet(Sheet::new("Sheet3"));

    document
}

/// A document with mixed content across two sheets, for ordering tests
pub fn mixed_document() -> Document {
    let mut document = Document::new();

    let mut first = Sheet::new("Overview");
    first.set_cell(1, 1, CellValue::Text("Title".to_string()));
    first.set_cell(1, 2, CellValue::Numeric("2024".to_string()));
    first.set_cell(2, 1, CellValue::Text("Subtitle".to_string()));
    first.set_cell(2, 2, CellValue::Formula("=A1".to_string()));
    document.push_sheet(first);

    let mut second = Sheet::new("Data");
    second.set_cell(1, 1, CellValue::Text("Region".to_string()));
    second.set_cell(1, 2, CellValue::Text("Revenue".to_string()));
    second.set_cell(2, 1, CellValue::Text("North".to_string()));
    second.set_cell(2, 2, CellValue::Numeric("1250.50".to_string()));
    document.push_sheet(second);

    document
}

/// Snapshot of every cell value for change detection
pub fn snapshot(document: &Document) -> Vec<(usize, u32, u32, CellValue)> {
    document
        .sheets
        .iter()
        .enumerate()
        .flat_map(|(si, sheet)| {
            sheet
                .iter()
                .map(move |(row, col, value)| (si, row, col, value.clone()))
                .collect::<Vec<_>>()
        })
        .collect()
}
