// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

//! Column descriptors.

mod column;

pub use self::column::*;
