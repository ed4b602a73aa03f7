//! Batch planning - split normalized items into oracle-sized chunks.

use crate::types::record::NormalizedItem;

/// A contiguous, ordered slice of items sent to the oracle in one call.
///
/// Indices the oracle sees are batch-local: position within `items`.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'b, 'a> {
    /// Zero-based batch number
    pub ordinal: usize,

    /// Items in this batch
    pub items: &'b [NormalizedItem<'a>],
}

impl<'b, 'a> Batch<'b, 'a> {
    /// Treat a whole item list as one batch.
    pub fn whole(items: &'b [NormalizedItem<'a>]) -> Self {
        Self {
            ordinal: 0,
            items,
        }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Split items into `ceil(N / max_batch_size)` contiguous batches.
///
/// Order is preserved; no item is dropped or repeated. A zero batch size
/// is treated as one.
pub fn plan<'b, 'a>(items: &'b [NormalizedItem<'a>], max_batch_size: usize) -> Vec<Batch<'b, 'a>> {
    let size = max_batch_size.max(1);
    items
        .chunks(size)
        .enumerate()
        .map(|(ordinal, chunk)| Batch {
            ordinal,
            items: chunk,
        })
        .collect()
}
