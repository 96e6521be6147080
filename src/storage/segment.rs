// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

//! Column segments.
//!
//! A chunk stores one segment per column. Segments are immutable once
//! installed; the sharing pass swaps whole segments through
//! [`Chunk::replace_segment`](crate::storage::Chunk::replace_segment).
//!
//! Two encodings exist: [`ValueSegment`] keeps values as-is, and
//! [`DictionarySegment`] stores a sorted, distinct dictionary plus a
//! fixed-width attribute vector of value ids. The value id
//! `dictionary.len()` is the NULL sentinel.

use std::sync::Arc;

use crate::for_all_variants;
use crate::storage::FixedWidthVector;
use crate::types::{DataTypeKind, F64};

/// A dictionary: a sorted, distinct, immutable sequence of values shared by
/// reference. Every segment of a merge group holds one clone of this handle.
pub type DictionaryRef<T> = Arc<Vec<T>>;

/// An element type that can be stored in a column segment.
pub trait DictionaryValue:
    Clone + Ord + std::fmt::Debug + Send + Sync + 'static
{
    const KIND: DataTypeKind;

    /// Heap bytes owned by one value, on top of its inline size.
    fn heap_byte_size(&self) -> usize {
        0
    }

    /// Extracts the typed segment out of a type-erased handle.
    fn as_segment(segment: &SegmentImpl) -> Option<&Segment<Self>>;

    fn into_segment_impl(segment: Segment<Self>) -> SegmentImpl;
}

/// Byte size of a value sequence, inline and heap parts included. Used for
/// dictionary accounting on both sides of a rewrite.
pub fn vector_byte_size<T: DictionaryValue>(values: &[T]) -> usize {
    std::mem::size_of_val(values) + values.iter().map(T::heap_byte_size).sum::<usize>()
}

impl DictionaryValue for i32 {
    const KIND: DataTypeKind = DataTypeKind::Int32;

    fn as_segment(segment: &SegmentImpl) -> Option<&Segment<Self>> {
        match segment {
            SegmentImpl::Int32(segment) => Some(segment),
            _ => None,
        }
    }

    fn into_segment_impl(segment: Segment<Self>) -> SegmentImpl {
        SegmentImpl::Int32(segment)
    }
}

impl DictionaryValue for i64 {
    const KIND: DataTypeKind = DataTypeKind::Int64;

    fn as_segment(segment: &SegmentImpl) -> Option<&Segment<Self>> {
        match segment {
            SegmentImpl::Int64(segment) => Some(segment),
            _ => None,
        }
    }

    fn into_segment_impl(segment: Segment<Self>) -> SegmentImpl {
        SegmentImpl::Int64(segment)
    }
}

impl DictionaryValue for F64 {
    const KIND: DataTypeKind = DataTypeKind::Float64;

    fn as_segment(segment: &SegmentImpl) -> Option<&Segment<Self>> {
        match segment {
            SegmentImpl::Float64(segment) => Some(segment),
            _ => None,
        }
    }

    fn into_segment_impl(segment: Segment<Self>) -> SegmentImpl {
        SegmentImpl::Float64(segment)
    }
}

impl DictionaryValue for String {
    const KIND: DataTypeKind = DataTypeKind::Varchar;

    fn heap_byte_size(&self) -> usize {
        self.len()
    }

    fn as_segment(segment: &SegmentImpl) -> Option<&Segment<Self>> {
        match segment {
            SegmentImpl::Utf8(segment) => Some(segment),
            _ => None,
        }
    }

    fn into_segment_impl(segment: Segment<Self>) -> SegmentImpl {
        SegmentImpl::Utf8(segment)
    }
}

/// An uncompressed segment.
#[derive(Clone, Debug)]
pub struct ValueSegment<T: DictionaryValue> {
    values: Vec<Option<T>>,
}

impl<T: DictionaryValue> ValueSegment<T> {
    pub fn new(values: impl IntoIterator<Item = Option<T>>) -> ValueSegment<T> {
        ValueSegment {
            values: values.into_iter().collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, row: usize) -> Option<&T> {
        self.values[row].as_ref()
    }

    pub fn memory_usage(&self) -> usize {
        std::mem::size_of_val(&self.values[..])
            + self.values.iter().flatten().map(T::heap_byte_size).sum::<usize>()
    }
}

/// A dictionary-encoded segment.
#[derive(Clone, Debug)]
pub struct DictionarySegment<T: DictionaryValue> {
    dictionary: DictionaryRef<T>,
    attribute_vector: FixedWidthVector,
    uses_shared_dictionary: bool,
}

impl<T: DictionaryValue> DictionarySegment<T> {
    /// Assembles a segment from its parts. The dictionary must be sorted and
    /// distinct, and every value id must be `<= dictionary.len()`.
    pub fn new(
        dictionary: DictionaryRef<T>,
        attribute_vector: FixedWidthVector,
        uses_shared_dictionary: bool,
    ) -> DictionarySegment<T> {
        debug_assert!(
            dictionary.windows(2).all(|pair| pair[0] < pair[1]),
            "dictionary must be sorted and distinct"
        );
        debug_assert!(
            attribute_vector.iter().all(|id| id as usize <= dictionary.len()),
            "value id out of dictionary range"
        );
        DictionarySegment {
            dictionary,
            attribute_vector,
            uses_shared_dictionary,
        }
    }

    /// Dictionary-encodes a sequence of values.
    pub fn from_values(values: impl IntoIterator<Item = Option<T>>) -> DictionarySegment<T> {
        let values: Vec<Option<T>> = values.into_iter().collect();
        let mut dictionary: Vec<T> = values.iter().flatten().cloned().collect();
        dictionary.sort_unstable();
        dictionary.dedup();
        let null_value_id = dictionary.len() as u32;
        let ids: Vec<u32> = values
            .iter()
            .map(|value| match value {
                Some(value) => {
                    let id = dictionary
                        .binary_search(value)
                        .expect("value missing from its own dictionary");
                    id as u32
                }
                None => null_value_id,
            })
            .collect();
        DictionarySegment::new(
            Arc::new(dictionary),
            FixedWidthVector::compress(&ids, null_value_id),
            false,
        )
    }

    /// Re-encodes this segment against another dictionary. Every non-null
    /// value must be present in `dictionary`; a miss is an invariant
    /// violation and aborts. The result is marked as sharing its dictionary.
    pub fn reencode(&self, dictionary: DictionaryRef<T>) -> DictionarySegment<T> {
        let null_value_id = dictionary.len() as u32;
        let mut ids = Vec::with_capacity(self.row_count());
        for row in 0..self.row_count() {
            match self.get(row) {
                Some(value) => {
                    let id = dictionary
                        .binary_search(value)
                        .expect("shared dictionary does not contain value");
                    ids.push(id as u32);
                }
                None => ids.push(null_value_id),
            }
        }
        DictionarySegment::new(
            dictionary,
            FixedWidthVector::compress(&ids, null_value_id),
            true,
        )
    }

    pub fn dictionary(&self) -> &DictionaryRef<T> {
        &self.dictionary
    }

    pub fn uses_shared_dictionary(&self) -> bool {
        self.uses_shared_dictionary
    }

    pub fn attribute_vector(&self) -> &FixedWidthVector {
        &self.attribute_vector
    }

    /// The value id reserved for NULL.
    pub fn null_value_id(&self) -> u32 {
        self.dictionary.len() as u32
    }

    pub fn row_count(&self) -> usize {
        self.attribute_vector.len()
    }

    pub fn get(&self, row: usize) -> Option<&T> {
        let id = self.attribute_vector.get(row);
        // The NULL sentinel is one past the end of the dictionary.
        self.dictionary.get(id as usize)
    }

    pub fn dictionary_byte_size(&self) -> usize {
        vector_byte_size(&self.dictionary)
    }

    pub fn memory_usage(&self) -> usize {
        self.dictionary_byte_size() + self.attribute_vector.byte_size()
    }
}

/// A typed segment of either encoding.
#[derive(Clone, Debug)]
pub enum Segment<T: DictionaryValue> {
    Value(Arc<ValueSegment<T>>),
    Dictionary(Arc<DictionarySegment<T>>),
}

impl<T: DictionaryValue> Segment<T> {
    pub fn row_count(&self) -> usize {
        match self {
            Segment::Value(segment) => segment.row_count(),
            Segment::Dictionary(segment) => segment.row_count(),
        }
    }

    pub fn get(&self, row: usize) -> Option<&T> {
        match self {
            Segment::Value(segment) => segment.get(row),
            Segment::Dictionary(segment) => segment.get(row),
        }
    }

    pub fn memory_usage(&self) -> usize {
        match self {
            Segment::Value(segment) => segment.memory_usage(),
            Segment::Dictionary(segment) => segment.memory_usage(),
        }
    }

    pub fn as_dictionary(&self) -> Option<&Arc<DictionarySegment<T>>> {
        match self {
            Segment::Dictionary(segment) => Some(segment),
            Segment::Value(_) => None,
        }
    }
}

macro_rules! impl_segment_impl {
    ([], $( { $Abc:ident, $Type:ty, $Kind:ident } ),*) => {
        /// Type-erased segment handle, as stored in a chunk. Cloning is
        /// cheap: the payload sits behind an `Arc`.
        #[derive(Clone, Debug)]
        pub enum SegmentImpl {
            $(
                $Abc(Segment<$Type>),
            )*
        }

        impl SegmentImpl {
            pub fn data_type_kind(&self) -> DataTypeKind {
                match self {
                    $(
                        Self::$Abc(_) => DataTypeKind::$Kind,
                    )*
                }
            }

            pub fn row_count(&self) -> usize {
                match self {
                    $(
                        Self::$Abc(segment) => segment.row_count(),
                    )*
                }
            }

            pub fn memory_usage(&self) -> usize {
                match self {
                    $(
                        Self::$Abc(segment) => segment.memory_usage(),
                    )*
                }
            }
        }

        $(
            impl From<DictionarySegment<$Type>> for SegmentImpl {
                fn from(segment: DictionarySegment<$Type>) -> SegmentImpl {
                    SegmentImpl::$Abc(Segment::Dictionary(Arc::new(segment)))
                }
            }

            impl From<ValueSegment<$Type>> for SegmentImpl {
                fn from(segment: ValueSegment<$Type>) -> SegmentImpl {
                    SegmentImpl::$Abc(Segment::Value(Arc::new(segment)))
                }
            }
        )*
    };
}

for_all_variants! { impl_segment_impl }
