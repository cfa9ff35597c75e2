use log::{debug, error, warn};

use super::extract::TranslationUnit;

// @module: Batch packing - bounded request groups for the provider

/// A bounded, ordered group of translation units sent in one request
#[derive(Debug, Clone)]
pub struct Batch {
    /// Position of this batch in the original sequence
    pub index: usize,

    /// Units in original relative order
    pub units: Vec<TranslationUnit>,
}

impl Batch {
    /// Number of units in the batch
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the batch carries no units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Combined character count of all unit texts
    pub fn char_total(&self) -> usize {
        self.units.iter().map(|u| u.char_len()).sum()
    }

    /// Borrow the source texts in order, the shape the provider wants
    pub fn texts(&self) -> Vec<String> {
        self.units.iter().map(|u| u.text.clone()).collect()
    }
}

/// Pack translation units into request batches.
///
/// Greedy packing: units accumulate into the current batch while the item
/// count stays below `max_items` and the running character total plus the
/// next unit stays within `max_chars`. When either bound would be exceeded
/// the batch is closed and a new one starts. A single unit longer than
/// `max_chars` still forms its own batch; units are never dropped and never
/// split mid-string. The produced batches partition the input contiguously
/// and exhaustively.
pub fn pack_batches(units: Vec<TranslationUnit>, max_items: usize, max_chars: usize) -> Vec<Batch> {
    if units.is_empty() {
        warn!("No translation units to pack into batches");
        return Vec::new();
    }

    let total_units = units.len();

    // Guard against unusable limits
    let max_items = max_items.max(1);
    let max_chars = max_chars.max(100);

    let mut batches: Vec<Batch> = Vec::new();
    let mut current: Vec<TranslationUnit> = Vec::new();
    let mut current_chars = 0usize;

    for unit in units {
        let unit_chars = unit.char_len();

        // An oversized unit gets a batch of its own
        if unit_chars > max_chars {
            if !current.is_empty() {
                batches.push(Batch {
                    index: batches.len(),
                    units: std::mem::take(&mut current),
                });
                current_chars = 0;
            }
            debug!(
                "Unit at {} is oversized ({} chars), placing in its own batch",
                unit.address, unit_chars
            );
            batches.push(Batch {
                index: batches.len(),
                units: vec![unit],
            });
            continue;
        }

        if !current.is_empty()
            && (current.len() >= max_items || current_chars + unit_chars > max_chars)
        {
            batches.push(Batch {
                index: batches.len(),
                units: std::mem::take(&mut current),
            });
            current_chars = 0;
        }

        current_chars += unit_chars;
        current.push(unit);
    }

    if !current.is_empty() {
        batches.push(Batch {
            index: batches.len(),
            units: current,
        });
    }

    // Verify that no unit was lost during packing
    let packed_units: usize = batches.iter().map(|b| b.len()).sum();
    if packed_units != total_units {
        error!(
            "CRITICAL ERROR: Lost units during batch packing! Original: {}, After packing: {}",
            total_units, packed_units
        );
    } else if log::max_level() >= log::LevelFilter::Debug {
        for batch in &batches {
            debug!(
                "Batch {}: {} units, {} chars",
                batch.index + 1,
                batch.len(),
                batch.char_total()
            );
        }
    }

    batches
}

/// Pick a batch item limit from corpus characteristics.
///
/// Used when the configured limit is 0 (auto). Scales a base size of 50 by
/// how many texts there are and how long they run, clamped to [10, 200].
pub fn optimal_batch_size(total_texts: usize, avg_text_len: f64) -> usize {
    let base = 50.0;

    let text_factor = if total_texts < 100 {
        0.6
    } else if total_texts < 500 {
        1.0
    } else if total_texts < 1000 {
        1.5
    } else {
        2.0
    };

    let length_factor = if avg_text_len <= 0.0 {
        1.0
    } else if avg_text_len < 50.0 {
        1.2
    } else if avg_text_len < 200.0 {
        1.0
    } else {
        0.7
    };

    let size = (base * text_factor * length_factor) as usize;
    size.clamp(10, 200)
}
