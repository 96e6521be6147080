// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

//! The dictionary sharing pass.
//!
//! Exposed as a host-loadable plugin: [`SharedDictionariesPlugin::start`]
//! runs the pass once over every table of the storage manager, merging
//! similar per-chunk dictionaries into shared ones. Merging is gated by the
//! Jaccard index of the dictionaries and never widens an attribute vector,
//! so the rewrite strictly reduces dictionary bytes while keeping the
//! column contents identical.

mod column_processor;
mod merge_plan;
mod similarity;

pub use self::column_processor::ColumnProcessor;
pub use self::merge_plan::{MergePlan, SegmentChunkPair};
pub use self::similarity::{jaccard_index, merge_admissible, sorted_union};

use std::env;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::ColumnCatalog;
use crate::for_all_variants;
use crate::storage::{StorageManager, StorageResult, Table};
use crate::types::DataTypeKind;

pub const DEFAULT_JACCARD_INDEX_THRESHOLD: f64 = 0.1;

/// Environment variable consulted when no threshold is passed explicitly.
pub const JACCARD_INDEX_THRESHOLD_ENV: &str = "JACCARD_INDEX_THRESHOLD";

/// Lifecycle hooks of a host-loaded module.
pub trait Plugin {
    fn description(&self) -> &'static str;

    fn start(&mut self) -> StorageResult<()>;

    fn stop(&mut self);
}

/// Counters of one pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SharingStats {
    pub total_bytes_saved: u64,
    pub total_previous_bytes: u64,
    pub modified_previous_bytes: u64,
    pub num_merged_dictionaries: usize,
    pub num_shared_dictionaries: usize,
    pub num_existing_merged_dictionaries: usize,
    pub num_existing_shared_dictionaries: usize,
}

/// Merges similar dictionaries within each column of the database.
pub struct SharedDictionariesPlugin {
    storage: Arc<StorageManager>,
    jaccard_index_threshold: f64,
    stats: SharingStats,
}

impl SharedDictionariesPlugin {
    /// Creates the plugin with the threshold taken from the environment, or
    /// the default when the variable is absent or invalid.
    pub fn new(storage: Arc<StorageManager>) -> SharedDictionariesPlugin {
        let threshold = threshold_from_env();
        SharedDictionariesPlugin {
            storage,
            jaccard_index_threshold: threshold,
            stats: SharingStats::default(),
        }
    }

    /// Creates the plugin with an explicit threshold, which takes precedence
    /// over the environment.
    pub fn with_threshold(
        storage: Arc<StorageManager>,
        jaccard_index_threshold: f64,
    ) -> SharedDictionariesPlugin {
        SharedDictionariesPlugin {
            storage,
            jaccard_index_threshold: validated_threshold(jaccard_index_threshold),
            stats: SharingStats::default(),
        }
    }

    pub fn jaccard_index_threshold(&self) -> f64 {
        self.jaccard_index_threshold
    }

    pub fn stats(&self) -> &SharingStats {
        &self.stats
    }

    /// Tables sorted by name, columns in definition order, chunks in chunk
    /// order: the traversal is fully determined.
    fn process_for_every_column(&mut self) -> StorageResult<()> {
        info!("starting creation of shared dictionaries");
        let mut table_names = self.storage.table_names();
        table_names.sort();
        for table_name in table_names {
            debug!("creating shared dictionaries for table: {}", table_name);
            let table = self.storage.get_table(&table_name)?;
            for column in table.columns() {
                debug!("creating shared dictionaries for column: {}", column.name());
                self.process_column(&table, &table_name, column);
            }
        }
        info!("completed creation of shared dictionaries");
        Ok(())
    }

    fn log_configuration(&self) {
        debug!(
            "plugin configuration: jaccard-index threshold = {}",
            self.jaccard_index_threshold
        );
    }

    fn log_processing_result(&self) {
        let percentage = |bytes: u64| {
            if bytes == 0 {
                0.0
            } else {
                (self.stats.total_bytes_saved as f64 / bytes as f64) * 100.0
            }
        };
        info!(
            "merged {} dictionaries down to {} shared dictionaries",
            self.stats.num_merged_dictionaries, self.stats.num_shared_dictionaries
        );
        info!(
            "found {} existing shared dictionaries used in {} dictionary encoded segments",
            self.stats.num_existing_shared_dictionaries,
            self.stats.num_existing_merged_dictionaries
        );
        info!(
            "saved {} bytes ({}% of modified, {}% of total)",
            self.stats.total_bytes_saved,
            percentage(self.stats.modified_previous_bytes).ceil(),
            percentage(self.stats.total_previous_bytes).ceil()
        );
    }
}

macro_rules! impl_process_column {
    ([], $( { $Abc:ident, $Type:ty, $Kind:ident } ),*) => {
        impl SharedDictionariesPlugin {
            fn process_column(
                &mut self,
                table: &Arc<Table>,
                table_name: &str,
                column: &ColumnCatalog,
            ) {
                match column.datatype().kind() {
                    $(
                        DataTypeKind::$Kind => ColumnProcessor::<$Type>::new(
                            table,
                            table_name,
                            column.id(),
                            column.name(),
                            self.jaccard_index_threshold,
                            &mut self.stats,
                        )
                        .process(),
                    )*
                }
            }
        }
    };
}

for_all_variants! { impl_process_column }

impl Plugin for SharedDictionariesPlugin {
    fn description(&self) -> &'static str {
        "shared dictionaries plugin"
    }

    fn start(&mut self) -> StorageResult<()> {
        self.stats = SharingStats::default();
        self.log_configuration();
        self.process_for_every_column()?;
        self.log_processing_result();
        Ok(())
    }

    fn stop(&mut self) {}
}

fn threshold_from_env() -> f64 {
    match env::var(JACCARD_INDEX_THRESHOLD_ENV) {
        Ok(raw) => parse_threshold(&raw),
        Err(env::VarError::NotPresent) => DEFAULT_JACCARD_INDEX_THRESHOLD,
        Err(err) => {
            warn!(
                "failed to read {}: {}, falling back to {}",
                JACCARD_INDEX_THRESHOLD_ENV, err, DEFAULT_JACCARD_INDEX_THRESHOLD
            );
            DEFAULT_JACCARD_INDEX_THRESHOLD
        }
    }
}

fn parse_threshold(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) => validated_threshold(value),
        Err(err) => {
            warn!(
                "failed to parse jaccard-index threshold {:?}: {}, falling back to {}",
                raw, err, DEFAULT_JACCARD_INDEX_THRESHOLD
            );
            DEFAULT_JACCARD_INDEX_THRESHOLD
        }
    }
}

fn validated_threshold(value: f64) -> f64 {
    if (0.0..=1.0).contains(&value) {
        value
    } else {
        warn!(
            "jaccard-index threshold {} is outside [0, 1], falling back to {}",
            value, DEFAULT_JACCARD_INDEX_THRESHOLD
        );
        DEFAULT_JACCARD_INDEX_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("0.25"), 0.25);
        assert_eq!(parse_threshold(" 1.0 "), 1.0);
        assert_eq!(parse_threshold("0"), 0.0);
        assert_eq!(parse_threshold("nonsense"), DEFAULT_JACCARD_INDEX_THRESHOLD);
        assert_eq!(parse_threshold("1.5"), DEFAULT_JACCARD_INDEX_THRESHOLD);
        assert_eq!(parse_threshold("-0.1"), DEFAULT_JACCARD_INDEX_THRESHOLD);
        assert_eq!(parse_threshold("NaN"), DEFAULT_JACCARD_INDEX_THRESHOLD);
    }

    #[test]
    fn test_explicit_threshold_is_validated() {
        let storage = Arc::new(StorageManager::new());
        let plugin = SharedDictionariesPlugin::with_threshold(storage.clone(), 0.7);
        assert_eq!(plugin.jaccard_index_threshold(), 0.7);
        let plugin = SharedDictionariesPlugin::with_threshold(storage, 2.0);
        assert_eq!(
            plugin.jaccard_index_threshold(),
            DEFAULT_JACCARD_INDEX_THRESHOLD
        );
    }

    #[test]
    fn test_threshold_from_env() {
        env::set_var(JACCARD_INDEX_THRESHOLD_ENV, "0.42");
        assert_eq!(threshold_from_env(), 0.42);
        env::set_var(JACCARD_INDEX_THRESHOLD_ENV, "bogus");
        assert_eq!(threshold_from_env(), DEFAULT_JACCARD_INDEX_THRESHOLD);
        env::remove_var(JACCARD_INDEX_THRESHOLD_ENV);
        assert_eq!(threshold_from_env(), DEFAULT_JACCARD_INDEX_THRESHOLD);
    }
}
