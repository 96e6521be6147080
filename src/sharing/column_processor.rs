// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

//! Per-column grouping and rewrite.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::merge_plan::{MergePlan, SegmentChunkPair};
use super::similarity::{jaccard_index, merge_admissible, sorted_union};
use super::SharingStats;
use crate::storage::{vector_byte_size, DictionaryRef, DictionaryValue, Segment, Table};
use crate::types::{ChunkId, ColumnId};

/// Finds and merges similar dictionaries within one column of a table.
///
/// The scan walks the column chunk by chunk. Each dictionary segment is
/// first compared against every active merge plan; if none admits it, it is
/// compared against the most recent unmerged segment, which may found a new
/// pairwise plan. Plans seeded from pre-existing shared dictionaries take
/// part like any other plan and can absorb further segments.
pub struct ColumnProcessor<'a, T: DictionaryValue> {
    table: &'a Arc<Table>,
    table_name: &'a str,
    column_id: ColumnId,
    column_name: &'a str,
    jaccard_index_threshold: f64,
    stats: &'a mut SharingStats,
    _marker: std::marker::PhantomData<T>,
}

impl<'a, T: DictionaryValue> ColumnProcessor<'a, T> {
    pub fn new(
        table: &'a Arc<Table>,
        table_name: &'a str,
        column_id: ColumnId,
        column_name: &'a str,
        jaccard_index_threshold: f64,
        stats: &'a mut SharingStats,
    ) -> Self {
        ColumnProcessor {
            table,
            table_name,
            column_id,
            column_name,
            jaccard_index_threshold,
            stats,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn process(&mut self) {
        let mut merge_plans = self.initialize_merge_plans();
        let mut previous: Option<SegmentChunkPair<T>> = None;

        let chunk_count = self.table.chunk_count();
        for chunk_id in 0..chunk_count as ChunkId {
            let Some(chunk) = self.table.get_chunk(chunk_id) else {
                continue;
            };
            let segment_impl = chunk.get_segment(self.column_id);
            self.stats.total_previous_bytes += segment_impl.memory_usage() as u64;

            let segment = T::as_segment(&segment_impl)
                .expect("segment type does not match the column data type");
            let Some(dictionary_segment) = segment.as_dictionary() else {
                debug!(
                    "[Table={}, Column={}] chunk {} is not dictionary encoded, skipping",
                    self.table_name, self.column_name, chunk_id
                );
                continue;
            };
            if dictionary_segment.uses_shared_dictionary() {
                // Captured by a seeded plan already.
                continue;
            }

            let current_dictionary = dictionary_segment.dictionary().clone();
            let pair = SegmentChunkPair {
                segment: dictionary_segment.clone(),
                chunk: chunk.clone(),
            };

            if let Some((plan_index, union)) =
                self.union_with_best_existing_plan(&current_dictionary, &merge_plans)
            {
                // The plan's dictionary is replaced by a fresh value, so
                // snapshots held by earlier members stay untouched.
                let plan = &mut merge_plans[plan_index];
                plan.shared_dictionary = Arc::new(union);
                plan.add_pair(pair, false);
                previous = None;
                continue;
            }

            if let Some(previous_pair) = previous.take() {
                if let Some(union) = self.union_with_previous(&current_dictionary, &previous_pair)
                {
                    let mut plan = MergePlan::new(Arc::new(union));
                    plan.add_pair(pair, false);
                    plan.add_pair(previous_pair, false);
                    merge_plans.push(plan);
                    continue;
                }
            }

            // Keep the unmerged segment around for a possible later merge.
            previous = Some(pair);
        }

        self.execute_merge_plans(merge_plans);
    }

    /// Seeds one plan per pre-existing shared dictionary, keyed by handle
    /// identity, in the order the dictionaries first appear in the column.
    fn initialize_merge_plans(&mut self) -> Vec<MergePlan<T>> {
        let mut merge_plans: Vec<MergePlan<T>> = Vec::new();
        let mut plan_index_by_dictionary: HashMap<*const Vec<T>, usize> = HashMap::new();

        let chunk_count = self.table.chunk_count();
        for chunk_id in 0..chunk_count as ChunkId {
            let Some(chunk) = self.table.get_chunk(chunk_id) else {
                continue;
            };
            let segment_impl = chunk.get_segment(self.column_id);
            let Some(dictionary_segment) =
                T::as_segment(&segment_impl).and_then(|segment| segment.as_dictionary())
            else {
                continue;
            };
            if !dictionary_segment.uses_shared_dictionary() {
                continue;
            }
            self.stats.num_existing_merged_dictionaries += 1;
            let shared_dictionary = dictionary_segment.dictionary();
            let plan_index = *plan_index_by_dictionary
                .entry(Arc::as_ptr(shared_dictionary))
                .or_insert_with(|| {
                    merge_plans.push(MergePlan::new(shared_dictionary.clone()));
                    merge_plans.len() - 1
                });
            merge_plans[plan_index].add_pair(
                SegmentChunkPair {
                    segment: dictionary_segment.clone(),
                    chunk: chunk.clone(),
                },
                true,
            );
        }

        self.stats.num_existing_shared_dictionaries += merge_plans.len();
        merge_plans
    }

    /// Unions the dictionary with every active plan and returns the plan of
    /// the highest admissible Jaccard index. Earlier plans win ties.
    fn union_with_best_existing_plan(
        &self,
        current_dictionary: &DictionaryRef<T>,
        merge_plans: &[MergePlan<T>],
    ) -> Option<(usize, Vec<T>)> {
        let mut best: Option<(usize, f64, Vec<T>)> = None;
        for (plan_index, plan) in merge_plans.iter().enumerate() {
            let union = sorted_union(current_dictionary, &plan.shared_dictionary);
            let total_size = current_dictionary.len() + plan.shared_dictionary.len();
            let jaccard = jaccard_index(union.len(), total_size - union.len());
            if best.as_ref().is_some_and(|(_, best_jaccard, _)| jaccard <= *best_jaccard) {
                continue;
            }
            let member_sizes = std::iter::once(current_dictionary.len())
                .chain(plan.member_dictionary_sizes());
            if merge_admissible(self.jaccard_index_threshold, jaccard, union.len(), member_sizes)
            {
                best = Some((plan_index, jaccard, union));
            }
        }
        best.map(|(plan_index, _, union)| (plan_index, union))
    }

    /// Unions the dictionary with the predecessor's and returns the shared
    /// dictionary if the pair may merge.
    fn union_with_previous(
        &self,
        current_dictionary: &DictionaryRef<T>,
        previous_pair: &SegmentChunkPair<T>,
    ) -> Option<Vec<T>> {
        let previous_dictionary = previous_pair.segment.dictionary();
        let union = sorted_union(current_dictionary, previous_dictionary);
        let total_size = current_dictionary.len() + previous_dictionary.len();
        let jaccard = jaccard_index(union.len(), total_size - union.len());
        let member_sizes = [current_dictionary.len(), previous_dictionary.len()];
        merge_admissible(self.jaccard_index_threshold, jaccard, union.len(), member_sizes)
            .then_some(union)
    }

    /// Installs every plan that captured at least one fresh segment: each
    /// member is re-encoded against the shared dictionary and swapped into
    /// its chunk.
    fn execute_merge_plans(&mut self, merge_plans: Vec<MergePlan<T>>) {
        for plan in merge_plans {
            assert!(
                plan.members.len() >= 2,
                "a merge plan must hold at least two segments"
            );
            if !plan.contains_non_merged_segment {
                continue;
            }
            self.stats.num_shared_dictionaries += 1;

            let new_dictionary_bytes = vector_byte_size(&plan.shared_dictionary) as u64;
            let mut previous_dictionary_bytes = plan.non_merged_dictionary_bytes;
            if plan.contains_already_merged_segment {
                // The group already paid for one shared dictionary.
                previous_dictionary_bytes += new_dictionary_bytes;
            }
            self.stats.modified_previous_bytes += plan.non_merged_total_bytes;

            let member_count = plan.members.len();
            for pair in &plan.members {
                self.stats.num_merged_dictionaries += 1;
                let new_segment = pair.segment.reencode(plan.shared_dictionary.clone());
                pair.chunk.replace_segment(
                    self.column_id,
                    T::into_segment_impl(Segment::Dictionary(Arc::new(new_segment))),
                );
            }

            assert!(
                new_dictionary_bytes <= previous_dictionary_bytes,
                "shared dictionary must not grow the dictionary footprint"
            );
            let bytes_saved = previous_dictionary_bytes - new_dictionary_bytes;
            self.stats.total_bytes_saved += bytes_saved;
            debug!(
                "[Table={}, Column={}] merged {} dictionaries saving {} bytes",
                self.table_name, self.column_name, member_count, bytes_saved
            );
        }
    }
}
