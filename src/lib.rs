// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

//! DictShare reduces the dictionary footprint of an in-memory columnar store.
//!
//! Columns are stored chunk by chunk as dictionary-encoded segments: a sorted,
//! distinct dictionary plus a fixed-width attribute vector of value ids. Within
//! one column, dictionaries of different chunks are often near-identical. The
//! [`sharing`] pass walks every column, groups chunks whose dictionaries are
//! similar enough (by Jaccard index), and replaces each group's segments with
//! new segments that reference a single shared dictionary. Attribute vectors
//! are re-encoded but never widened, and the values visible through a column
//! are bit-for-bit unchanged.

pub mod catalog;
pub mod sharing;
pub mod storage;
pub mod types;
