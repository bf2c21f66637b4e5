// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while preparing engine launches.

/// Result alias for launch helpers.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced while converting launch arguments for C.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// An argument contained a NUL byte and cannot become a C string.
    #[error("argument {index} contains an interior NUL byte")]
    InteriorNul {
        /// Position in the vector; 0 is the program name.
        index: usize,
    },
    /// The vector does not fit in a C `int` count.
    #[error("too many arguments for a C argv: {0}")]
    TooManyArgs(usize),
}
