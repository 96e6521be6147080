// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

use parking_lot::RwLock;

use crate::storage::SegmentImpl;
use crate::types::ColumnId;

/// A horizontal slice of a table: one segment per column.
pub struct Chunk {
    segments: RwLock<Vec<SegmentImpl>>,
}

impl Chunk {
    pub(crate) fn new(segments: Vec<SegmentImpl>) -> Chunk {
        Chunk {
            segments: RwLock::new(segments),
        }
    }

    pub fn row_count(&self) -> usize {
        self.segments.read().first().map_or(0, SegmentImpl::row_count)
    }

    pub fn get_segment(&self, column_id: ColumnId) -> SegmentImpl {
        self.segments.read()[column_id as usize].clone()
    }

    /// Swaps the segment of one column. The swap is atomic with respect to
    /// readers; a replacement must keep the column's data type and row count.
    pub fn replace_segment(&self, column_id: ColumnId, segment: SegmentImpl) {
        let mut segments = self.segments.write();
        let slot = &mut segments[column_id as usize];
        assert_eq!(
            segment.data_type_kind(),
            slot.data_type_kind(),
            "replacement segment changes the column data type"
        );
        assert_eq!(
            segment.row_count(),
            slot.row_count(),
            "replacement segment changes the row count"
        );
        *slot = segment;
    }
}
