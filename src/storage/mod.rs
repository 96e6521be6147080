// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

//! The in-memory columnar store the sharing pass operates on.

mod chunk;
mod compressed_vector;
mod segment;
mod table;

pub use self::chunk::Chunk;
pub use self::compressed_vector::{FixedWidthVector, IdWidth};
pub use self::segment::{
    vector_byte_size, DictionaryRef, DictionarySegment, DictionaryValue, Segment, SegmentImpl,
    ValueSegment,
};
pub use self::table::Table;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::{ColumnId, DataTypeKind};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum StorageError {
    #[error("{0}({1}) not found")]
    NotFound(&'static str, String),
    #[error("duplicated {0}: {1}")]
    Duplicated(&'static str, String),
    #[error("chunk has {actual} segments, table has {expected} columns")]
    ColumnCountMismatch { expected: usize, actual: usize },
    #[error("segment type {actual:?} does not match column {column} of type {expected:?}")]
    TypeMismatch {
        column: ColumnId,
        expected: DataTypeKind,
        actual: DataTypeKind,
    },
    #[error("segment row counts differ within a chunk")]
    RowCountMismatch,
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Holds every table of the database by name.
pub struct StorageManager {
    tables: Mutex<HashMap<String, Arc<Table>>>,
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageManager {
    pub fn new() -> StorageManager {
        StorageManager {
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn add_table(&self, table_name: impl Into<String>, table: Table) -> StorageResult<()> {
        let table_name = table_name.into();
        let mut tables = self.tables.lock();
        if tables.contains_key(&table_name) {
            return Err(StorageError::Duplicated("table", table_name));
        }
        tables.insert(table_name, Arc::new(table));
        Ok(())
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.lock().keys().cloned().collect()
    }

    pub fn get_table(&self, table_name: &str) -> StorageResult<Arc<Table>> {
        self.tables
            .lock()
            .get(table_name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound("table", table_name.to_string()))
    }
}
