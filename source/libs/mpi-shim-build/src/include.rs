// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Include search path overrides for C tooling.

use std::env;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Variable clang and gcc read for extra C include directories.
pub const INCLUDE_PATH_VAR: &str = "C_INCLUDE_PATH";

/// Puts `dir` in front of an existing search path so its headers win.
///
/// Empty entries in `existing` are dropped; the platform separator is used.
pub fn prepend_include_path(dir: &Path, existing: Option<&str>) -> Result<String> {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(existing) = existing {
        paths.extend(env::split_paths(existing).filter(|p| !p.as_os_str().is_empty()));
    }
    let joined = env::join_paths(paths)?;
    joined.into_string().map_err(|_| Error::NotUnicode(INCLUDE_PATH_VAR.to_string()))
}

/// Splits a search path into its entries.
pub fn split_include_path(value: &str) -> Vec<PathBuf> {
    env::split_paths(value).filter(|p| !p.as_os_str().is_empty()).collect()
}
