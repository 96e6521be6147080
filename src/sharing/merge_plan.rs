// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

use std::sync::Arc;

use crate::storage::{Chunk, DictionaryRef, DictionarySegment, DictionaryValue};

/// A dictionary segment together with the chunk it lives in.
#[derive(Clone)]
pub struct SegmentChunkPair<T: DictionaryValue> {
    pub segment: Arc<DictionarySegment<T>>,
    pub chunk: Arc<Chunk>,
}

/// A group of segments that will share one dictionary after rewrite.
///
/// The shared dictionary grows as members are captured; byte totals are
/// tracked for fresh members only, since segments that already share a
/// dictionary contribute no extra dictionary bytes to the "before" side.
pub struct MergePlan<T: DictionaryValue> {
    pub shared_dictionary: DictionaryRef<T>,
    pub members: Vec<SegmentChunkPair<T>>,
    pub contains_non_merged_segment: bool,
    pub contains_already_merged_segment: bool,
    pub non_merged_total_bytes: u64,
    pub non_merged_dictionary_bytes: u64,
}

impl<T: DictionaryValue> MergePlan<T> {
    pub fn new(shared_dictionary: DictionaryRef<T>) -> MergePlan<T> {
        MergePlan {
            shared_dictionary,
            members: Vec::new(),
            contains_non_merged_segment: false,
            contains_already_merged_segment: false,
            non_merged_total_bytes: 0,
            non_merged_dictionary_bytes: 0,
        }
    }

    pub fn add_pair(&mut self, pair: SegmentChunkPair<T>, already_merged: bool) {
        if already_merged {
            self.contains_already_merged_segment = true;
        } else {
            self.contains_non_merged_segment = true;
            self.non_merged_dictionary_bytes += pair.segment.dictionary_byte_size() as u64;
            self.non_merged_total_bytes += pair.segment.memory_usage() as u64;
        }
        self.members.push(pair);
    }

    pub fn member_dictionary_sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().map(|pair| pair.segment.dictionary().len())
    }
}
