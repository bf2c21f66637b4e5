// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! `shim.toml` build configuration.
//!
//! Every field has a default, so an absent file and an empty file mean
//! the same thing. Unknown keys are rejected to catch typos early.
//!
//! ```toml
//! [engine]
//! header = "engine/library.h"
//! link_lib = "engine"
//! pkg_config = "libengine"
//! makefile = "engine/src/MAKE/Makefile.serial"
//!
//! [env]
//! source_var = "MPI_SHIM_SOURCE"
//! rerun = ["ENGINE_HOME"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::mode::DEFAULT_SOURCE_VAR;
use crate::{Error, Result};

/// Top-level configuration document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShimConfig {
    /// Native engine settings.
    pub engine: EngineConfig,
    /// MPI placeholder settings.
    pub mpi: MpiConfig,
    /// Environment variables consulted by the build.
    pub env: EnvConfig,
}

/// Native engine settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Header declaring the engine API, as written in an `#include`.
    pub header: String,
    /// Entry point taking a communicator; declared by hand, never generated.
    pub entry: String,
    /// `pkg-config` package describing a system install, if any.
    pub pkg_config: Option<String>,
    /// Library to link, if the build should link the engine at all.
    pub link_lib: Option<String>,
    /// Extra library search directories, relative to the crate root.
    pub link_search: Vec<PathBuf>,
    /// Extra preprocessor defines (`NAME` or `NAME=VALUE`).
    pub defines: Vec<String>,
    /// Engine makefile to take compile and link flags from.
    pub makefile: Option<PathBuf>,
    /// Makefile variables holding `-D`/`-I` flags.
    pub include_vars: Vec<String>,
    /// Makefile variables holding `-L`/`-l` flags.
    pub lib_vars: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            header: "engine/library.h".to_string(),
            entry: "engine_open".to_string(),
            pkg_config: None,
            link_lib: None,
            link_search: Vec::new(),
            defines: Vec::new(),
            makefile: None,
            include_vars: vec!["ENGINE_INC".to_string(), "MPI_INC".to_string()],
            lib_vars: vec!["MPI_PATH".to_string(), "MPI_LIB".to_string()],
        }
    }
}

/// MPI placeholder settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MpiConfig {
    /// Directory with the placeholder `mpi.h`, relative to the crate root.
    pub fake_include: PathBuf,
}

impl Default for MpiConfig {
    fn default() -> Self {
        Self { fake_include: PathBuf::from("include/fake-system") }
    }
}

/// Environment variables consulted by the build.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    /// Variable selecting the engine source mode.
    pub source_var: String,
    /// Extra variables that should trigger a rebuild.
    pub rerun: Vec<String>,
    /// File listing more rerun variables, one per line, `#` comments.
    pub rerun_file: Option<PathBuf>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self { source_var: DEFAULT_SOURCE_VAR.to_string(), rerun: Vec::new(), rerun_file: None }
    }
}

impl ShimConfig {
    /// Parses a configuration document held in memory.
    pub fn parse_str(input: &str) -> Result<Self> {
        parse(input, "<inline>")
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
        parse(&text, &path.display().to_string())
    }

    /// Like [`ShimConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("no config at {}; using defaults", path.display());
            Ok(Self::default())
        }
    }
}

fn parse(input: &str, origin: &str) -> Result<ShimConfig> {
    toml::from_str(input).map_err(|source| Error::Parse { origin: origin.to_string(), source })
}
