// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! MPI symbol filtering for binding generation.
//!
//! Without system MPI, every MPI type pulled in through the placeholder
//! header must stay out of generated bindings.

use std::sync::OnceLock;

use regex::Regex;

/// Blocklist pattern handed to binding generators.
pub const MPI_SYMBOL_PATTERN: &str = "([oOpP])?[mM][pP][iI].*";

/// Matches the whole of `name` against [`MPI_SYMBOL_PATTERN`], the way
/// binding generators apply blocklist entries.
pub fn is_mpi_symbol(name: &str) -> bool {
    mpi_symbol_regex().is_match(name)
}

fn mpi_symbol_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!("^(?:{MPI_SYMBOL_PATTERN})$"))
            .unwrap_or_else(|err| panic!("bad MPI symbol pattern: {err}"))
    })
}

/// Splits `names` into (kept, blocked).
pub fn partition<'a, I>(names: I) -> (Vec<&'a str>, Vec<&'a str>)
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().partition(|name| !is_mpi_symbol(name))
}
