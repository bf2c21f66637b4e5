// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Where the engine library comes from.

use core::fmt;

use crate::{Error, Result};

/// Variable consulted when the configuration does not name one.
pub const DEFAULT_SOURCE_VAR: &str = "MPI_SHIM_SOURCE";

/// Engine library source selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceMode {
    /// Prefer a system install, fall back to building from source.
    #[default]
    Auto,
    /// Only accept a system install.
    SystemOnly,
    /// Always build from source.
    BuildOnly,
}

impl SourceMode {
    /// Parses the value of `var`. Unset or empty means [`SourceMode::Auto`].
    pub fn parse(var: &str, value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("auto") => Ok(Self::Auto),
            Some("system") => Ok(Self::SystemOnly),
            Some("build") => Ok(Self::BuildOnly),
            Some(other) => Err(Error::BadMode { var: var.to_string(), value: other.to_string() }),
        }
    }

    /// Value accepted by [`SourceMode::parse`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::SystemOnly => "system",
            Self::BuildOnly => "build",
        }
    }

    /// Returns `true` if a system install may satisfy the build.
    pub const fn allows_system(self) -> bool {
        !matches!(self, Self::BuildOnly)
    }

    /// Returns `true` if the engine may be built from source.
    pub const fn allows_build(self) -> bool {
        !matches!(self, Self::SystemOnly)
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
