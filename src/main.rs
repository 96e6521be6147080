// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

//! Runs the sharing pass over a small demo database and prints the result.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dictshare::catalog::ColumnCatalog;
use dictshare::sharing::{Plugin, SharedDictionariesPlugin};
use dictshare::storage::{DictionarySegment, SegmentImpl, StorageManager, Table};
use dictshare::types::{DataTypeExt, DataTypeKind};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// DictShare: merge similar per-chunk dictionaries into shared ones.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Minimum Jaccard index for two dictionaries to be merged. Falls back
    /// to the JACCARD_INDEX_THRESHOLD environment variable, then to 0.1.
    #[clap(long)]
    jaccard_index_threshold: Option<f64>,
}

fn status_chunk(statuses: &[&str], quantities: &[Option<i32>]) -> Vec<SegmentImpl> {
    vec![
        DictionarySegment::from_values(statuses.iter().map(|s| Some(s.to_string()))).into(),
        DictionarySegment::from_values(quantities.iter().copied()).into(),
    ]
}

fn build_demo_database() -> Result<Arc<StorageManager>> {
    let storage = Arc::new(StorageManager::new());

    // Chunks of a status column draw from nearly the same small domain, the
    // typical case dictionary sharing pays off on.
    let orders = Table::new(vec![
        ColumnCatalog::new(0, "status", DataTypeKind::Varchar.not_null()),
        ColumnCatalog::new(1, "quantity", DataTypeKind::Int32.nullable()),
    ]);
    orders.append_chunk(status_chunk(
        &["open", "paid", "shipped", "open"],
        &[Some(10), Some(3), Some(7), None],
    ))?;
    orders.append_chunk(status_chunk(
        &["open", "paid", "shipped", "returned"],
        &[Some(4), Some(4), Some(12), Some(1)],
    ))?;
    orders.append_chunk(status_chunk(
        &["paid", "shipped", "open", "paid"],
        &[Some(2), None, Some(9), Some(5)],
    ))?;
    storage.add_table("orders", orders)?;

    let events = Table::new(vec![ColumnCatalog::new(
        0,
        "kind",
        DataTypeKind::Varchar.not_null(),
    )]);
    events.append_chunk(vec![DictionarySegment::from_values(
        ["click", "view", "view"].map(|s| Some(s.to_string())),
    )
    .into()])?;
    events.append_chunk(vec![DictionarySegment::from_values(
        ["purchase", "refund"].map(|s| Some(s.to_string())),
    )
    .into()])?;
    storage.add_table("events", events)?;

    Ok(storage)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();
    let storage = build_demo_database()?;

    let mut plugin = match args.jaccard_index_threshold {
        Some(threshold) => SharedDictionariesPlugin::with_threshold(storage, threshold),
        None => SharedDictionariesPlugin::new(storage),
    };
    plugin.start()?;
    println!("{:#?}", plugin.stats());
    Ok(())
}
