// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cargo build-script output lines.

use core::fmt;
use std::path::PathBuf;

/// One instruction printed by a build script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// Rebuild when a file changes.
    RerunIfChanged(PathBuf),
    /// Rebuild when an environment variable changes.
    RerunIfEnvChanged(String),
    /// Set a `--cfg` for the crate.
    RustcCfg {
        /// Cfg name.
        name: String,
        /// Optional value, rendered quoted.
        value: Option<String>,
    },
    /// Declare the expected values of a cfg.
    RustcCheckCfg {
        /// Cfg name.
        name: String,
        /// Allowed values.
        values: Vec<String>,
    },
    /// Compile-time environment variable for `env!`.
    RustcEnv {
        /// Variable name.
        key: String,
        /// Variable value.
        value: String,
    },
    /// Link a library.
    RustcLinkLib(String),
    /// Add a library search directory.
    RustcLinkSearch(PathBuf),
    /// Raw `-l`/`-L` flags.
    RustcFlags(String),
    /// Warning shown by cargo.
    Warning(String),
}

impl Directive {
    /// Prints the directive to stdout for cargo.
    pub fn emit(&self) {
        println!("{self}");
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RerunIfChanged(path) => write!(f, "cargo::rerun-if-changed={}", path.display()),
            Self::RerunIfEnvChanged(var) => write!(f, "cargo::rerun-if-env-changed={var}"),
            Self::RustcCfg { name, value: None } => write!(f, "cargo::rustc-cfg={name}"),
            Self::RustcCfg { name, value: Some(value) } => {
                write!(f, "cargo::rustc-cfg={name}=\"{value}\"")
            }
            Self::RustcCheckCfg { name, values } => {
                let quoted: Vec<String> = values.iter().map(|v| format!("\"{v}\"")).collect();
                write!(f, "cargo::rustc-check-cfg=cfg({name}, values({}))", quoted.join(", "))
            }
            Self::RustcEnv { key, value } => write!(f, "cargo::rustc-env={key}={value}"),
            Self::RustcLinkLib(name) => write!(f, "cargo::rustc-link-lib={name}"),
            Self::RustcLinkSearch(path) => write!(f, "cargo::rustc-link-search={}", path.display()),
            Self::RustcFlags(flags) => write!(f, "cargo::rustc-flags={flags}"),
            Self::Warning(message) => write!(f, "cargo::warning={message}"),
        }
    }
}
