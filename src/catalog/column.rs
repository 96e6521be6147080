// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

use crate::types::{ColumnId, DataType};

/// The catalog of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCatalog {
    id: ColumnId,
    name: String,
    datatype: DataType,
}

impl ColumnCatalog {
    pub fn new(id: ColumnId, name: impl Into<String>, datatype: DataType) -> ColumnCatalog {
        ColumnCatalog {
            id,
            name: name.into(),
            datatype,
        }
    }

    pub fn id(&self) -> ColumnId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }
}
