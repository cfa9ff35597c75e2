use log::debug;

use crate::document::classifier::{classify, Classification};
use crate::document::model::{CellRef, Document};

// @module: Text extraction - document to ordered translation units

// @struct: One extracted (address, source text) pair
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    // @field: Where the text came from, and where the translation goes back
    pub address: CellRef,

    // @field: Source text, exactly as stored in the cell
    pub text: String,
}

impl TranslationUnit {
    /// Create a new unit
    pub fn new(address: CellRef, text: impl Into<String>) -> Self {
        TranslationUnit {
            address,
            text: text.into(),
        }
    }

    /// Length in characters, the quantity the batcher budgets on
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Extract all translatable text from a document.
///
/// Walks sheets in document order, rows top-to-bottom, columns left-to-right,
/// and emits one unit per cell the classifier marks Translatable. The
/// ordering is stable and deterministic; batch reconstruction depends on it.
/// A document with no translatable cells yields an empty vector, not an error.
pub fn extract(document: &Document) -> Vec<TranslationUnit> {
    let mut units = Vec::new();

    for (sheet_index, sheet) in document.sheets.iter().enumerate() {
        let before = units.len();
        for (row, col, value) in sheet.iter() {
            if classify(value) == Classification::Translatable {
                let address = CellRef::new(sheet_index, row, col);
                // Classification guarantees a text payload here
                if let Some(text) = value.as_text() {
                    units.push(TranslationUnit::new(address, text));
                }
            }
        }
        debug!(
            "Sheet '{}': {} translatable cells",
            sheet.name,
            units.len() - before
        );
    }

    units
}
