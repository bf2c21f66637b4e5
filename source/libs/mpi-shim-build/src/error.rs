// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error surface for build planning.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::makefile::MakefileError;

/// Result alias used across the build-support crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced while resolving a build plan.
#[derive(Debug, Error)]
pub enum Error {
    /// The source-mode variable held an unknown value.
    #[error("bad value for {var}: `{value}` (expected auto, system or build)")]
    BadMode {
        /// Variable that was read.
        var: String,
        /// Offending value.
        value: String,
    },
    /// An environment variable was set but not valid unicode.
    #[error("environment variable {0} is not unicode")]
    NotUnicode(String),
    /// A makefile variable could not be read or written.
    #[error("makefile {path}: {source}")]
    Makefile {
        /// Makefile being edited.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: MakefileError,
    },
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A configuration document failed to parse.
    #[error("failed to parse {origin}: {source}")]
    Parse {
        /// File path, or `<inline>` for in-memory documents.
        origin: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// System-only mode could not find the engine through `pkg-config`.
    #[error("system {library} not found: {source}")]
    NotInstalled {
        /// Library name handed to `pkg-config`.
        library: String,
        /// Underlying `pkg-config` failure.
        #[source]
        source: pkg_config::Error,
    },
    /// An include directory cannot be placed on a search path.
    #[error("invalid include path entry: {0}")]
    JoinPaths(#[from] std::env::JoinPathsError),
}
