// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

use std::sync::Arc;

use itertools::Itertools;
use parking_lot::RwLock;

use crate::catalog::ColumnCatalog;
use crate::storage::{Chunk, SegmentImpl, StorageError, StorageResult};
use crate::types::ChunkId;

/// A table: column definitions plus an ordered sequence of chunks.
///
/// A chunk slot may be vacated (physical delete); readers skip vacant slots
/// and chunk ids of the remaining chunks are stable.
pub struct Table {
    columns: Vec<ColumnCatalog>,
    chunks: RwLock<Vec<Option<Arc<Chunk>>>>,
}

impl Table {
    pub fn new(columns: Vec<ColumnCatalog>) -> Table {
        assert!(
            columns.iter().enumerate().all(|(idx, col)| col.id() as usize == idx),
            "column ids must follow definition order"
        );
        Table {
            columns,
            chunks: RwLock::new(Vec::new()),
        }
    }

    pub fn columns(&self) -> &[ColumnCatalog] {
        &self.columns
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.read().len()
    }

    /// Returns the chunk, or `None` if the slot has been vacated.
    pub fn get_chunk(&self, chunk_id: ChunkId) -> Option<Arc<Chunk>> {
        self.chunks.read().get(chunk_id as usize).cloned().flatten()
    }

    /// Appends a chunk built from one segment per column.
    pub fn append_chunk(&self, segments: Vec<SegmentImpl>) -> StorageResult<ChunkId> {
        if segments.len() != self.columns.len() {
            return Err(StorageError::ColumnCountMismatch {
                expected: self.columns.len(),
                actual: segments.len(),
            });
        }
        for (column, segment) in self.columns.iter().zip(&segments) {
            if segment.data_type_kind() != column.datatype().kind() {
                return Err(StorageError::TypeMismatch {
                    column: column.id(),
                    expected: column.datatype().kind(),
                    actual: segment.data_type_kind(),
                });
            }
        }
        if !segments.iter().map(SegmentImpl::row_count).all_equal() {
            return Err(StorageError::RowCountMismatch);
        }
        let mut chunks = self.chunks.write();
        chunks.push(Some(Arc::new(Chunk::new(segments))));
        Ok((chunks.len() - 1) as ChunkId)
    }

    /// Vacates a chunk slot.
    pub fn remove_chunk(&self, chunk_id: ChunkId) -> StorageResult<()> {
        let mut chunks = self.chunks.write();
        match chunks.get_mut(chunk_id as usize) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                Ok(())
            }
            _ => Err(StorageError::NotFound("chunk", chunk_id.to_string())),
        }
    }
}
