// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

//! Column data types and id aliases.

use serde::{Deserialize, Serialize};

pub use ordered_float::OrderedFloat;

/// 64-bit float with a total order, so it can live in a sorted dictionary.
pub type F64 = OrderedFloat<f64>;

pub type ColumnId = u32;
pub type ChunkId = u32;

/// The element type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataTypeKind {
    Int32,
    Int64,
    Float64,
    Varchar,
}

/// Data type with nullable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    pub kind: DataTypeKind,
    pub nullable: bool,
}

impl std::fmt::Debug for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if self.nullable {
            write!(f, " (null)")?;
        }
        Ok(())
    }
}

impl DataType {
    pub const fn new(kind: DataTypeKind, nullable: bool) -> DataType {
        DataType { kind, nullable }
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn kind(&self) -> DataTypeKind {
        self.kind
    }
}

/// The extension methods for [`DataType`].
pub trait DataTypeExt {
    fn nullable(self) -> DataType;
    fn not_null(self) -> DataType;
}

impl DataTypeExt for DataTypeKind {
    fn nullable(self) -> DataType {
        DataType::new(self, true)
    }

    fn not_null(self) -> DataType {
        DataType::new(self, false)
    }
}

/// Expands a payload macro once with the full table of supported column
/// element types. Each entry is `{ Variant, ElementType, DataTypeKind }`,
/// where `Variant` names the arm of [`SegmentImpl`] and `DataTypeKind` the
/// arm of the type enum.
///
/// [`SegmentImpl`]: crate::storage::SegmentImpl
#[macro_export]
macro_rules! for_all_variants {
    ($macro:ident $(, $x:tt)*) => {
        $macro! {
            [$($x),*],
            { Int32, i32, Int32 },
            { Int64, i64, Int64 },
            { Float64, $crate::types::F64, Float64 },
            { Utf8, String, Varchar }
        }
    };
}
