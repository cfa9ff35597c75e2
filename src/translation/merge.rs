use log::{debug, trace};

use super::batch::Batch;
use crate::document::model::{CellValue, Document};
use crate::errors::MergeError;

// @module: Result merging - translated strings back into the document

/// Write one translated batch back into the document.
///
/// Each translated string replaces the text payload of the cell at its
/// unit's recorded address; the tag and everything structural stay untouched.
/// If any address no longer resolves to a text cell the merge aborts with
/// [`MergeError::AddressResolution`], leaving the document in the
/// last-fully-merged state. That situation indicates a concurrency or
/// corruption bug and is never silently ignored.
pub fn merge_batch(
    document: &mut Document,
    batch: &Batch,
    translated: &[String],
) -> Result<(), MergeError> {
    if translated.len() != batch.len() {
        return Err(MergeError::LengthMismatch {
            expected: batch.len(),
            translated: translated.len(),
        });
    }

    // Verify every address first so a bad unit aborts the whole batch
    // before any cell is written
    for unit in &batch.units {
        match document.cell(unit.address) {
            Some(CellValue::Text(_)) => {}
            _ => {
                return Err(MergeError::AddressResolution {
                    address: unit.address,
                });
            }
        }
    }

    for (unit, translation) in batch.units.iter().zip(translated) {
        // The pre-pass guarantees resolution here
        if let Some(value) = document.cell_mut(unit.address) {
            trace!("Merging {}: {:?}", unit.address, translation);
            *value = CellValue::Text(translation.clone());
        }
    }

    debug!(
        "Merged batch {} ({} cells)",
        batch.index + 1,
        batch.len()
    );
    Ok(())
}
