/*!
 * Tests for the workbook model and text extraction
 */

use xlation::document::classifier::{classify, Classification};
use xlation::document::model::{CellRef, CellValue, Document};
use xlation::translation::extract::extract;
use xlation::translation::merge::merge_batch;
use xlation::translation::batch::Batch;

use crate::common;

/// Extraction emits only translatable cells
#[test]
fn test_extract_withMixedContent_shouldSkipNonText() {
    let document = common::three_sheet_document();
    let units = extract(&document);

    assert_eq!(units.len(), 1);
    assert_eq!(units[0].address, CellRef::new(0, 1, 1));
    assert_eq!(units[0].text, "Hello");
}

/// Extraction order is sheet order, then row-major within a sheet
#[test]
fn test_extract_shouldWalkSheetsInOrderRowMajor() {
    let document = common::mixed_document();
    let units = extract(&document);

    let texts: Vec<&str> = units.iter().map(|u| u.text.as_str()).collect();
    assert_eq!(texts, vec!["Title", "Subtitle", "Region", "Revenue", "North"]);

    let addresses: Vec<CellRef> = units.iter().map(|u| u.address).collect();
    assert_eq!(
        addresses,
        vec![
            CellRef::new(0, 1, 1),
            CellRef::new(0, 2, 1),
            CellRef::new(1, 1, 1),
            CellRef::new(1, 1, 2),
            CellRef::new(1, 2, 1),
        ]
    );
}

/// An empty document extracts to an empty sequence, not an error
#[test]
fn test_extract_withEmptyDocument_shouldReturnEmpty() {
    let document = Document::new();
    assert!(extract(&document).is_empty());
}

/// The classification invariant: nothing the extractor emits classifies
/// as anything but Translatable
#[test]
fn test_extract_outputs_shouldAllClassifyTranslatable() {
    let document = common::mixed_document();
    for unit in extract(&document) {
        let value = document.cell(unit.address).expect("address must resolve");
        assert_eq!(classify(value), Classification::Translatable);
    }
}

/// Echo round trip: extracting and merging the original texts leaves the
/// document unchanged
#[test]
fn test_extract_then_merge_withOriginalTexts_shouldBeIdentity() {
    let mut document = common::mixed_document();
    let before = common::snapshot(&document);

    let units = extract(&document);
    let originals: Vec<String> = units.iter().map(|u| u.text.clone()).collect();
    let batch = Batch { index: 0, units };

    merge_batch(&mut document, &batch, &originals).unwrap();
    assert_eq!(common::snapshot(&document), before);
}

/// Merging replaces text payloads and only text payloads
#[test]
fn test_merge_shouldNotTouchTagsOrOtherCells() {
    let mut document = common::three_sheet_document();
    let units = extract(&document);
    let batch = Batch { index: 0, units };

    merge_batch(&mut document, &batch, &["Bonjour".to_string()]).unwrap();

    assert_eq!(
        document.cell(CellRef::new(0, 1, 1)),
        Some(&CellValue::Text("Bonjour".to_string()))
    );
    assert_eq!(
        document.cell(CellRef::new(0, 2, 1)),
        Some(&CellValue::Formula("=SUM(B1:B2)".to_string()))
    );
    assert_eq!(
        document.cell(CellRef::new(0, 3, 1)),
        Some(&CellValue::Numeric("42".to_string()))
    );
}
