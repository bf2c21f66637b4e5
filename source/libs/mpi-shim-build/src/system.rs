// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Finding a system engine install through `pkg-config`.
//!
//! `pkg-config` is kept from printing cargo metadata itself; whatever it finds is
//! merged into the plan, which owns every directive.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::flags::{CcFlag, CcFlags};

/// Variables `pkg-config` consults, reported for rerun whenever it is consulted.
pub const PKG_CONFIG_ENV: [&str; 4] =
    ["PKG_CONFIG", "PKG_CONFIG_PATH", "PKG_CONFIG_LIBDIR", "PKG_CONFIG_SYSROOT_DIR"];

/// Flags describing a system install.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemInstall {
    /// `-D` flags from the `.pc` file.
    pub defines: CcFlags,
    /// `-I` flags from the `.pc` file.
    pub include_dirs: CcFlags,
    /// `-L`/`-l` flags from the `.pc` file.
    pub link_flags: CcFlags,
}

impl SystemInstall {
    /// Builds the flag sets from what `pkg-config` reported.
    ///
    /// Defines are sorted by name so the plan does not depend on hash order.
    pub fn from_parts(
        include_paths: &[PathBuf],
        defines: &HashMap<String, Option<String>>,
        link_paths: &[PathBuf],
        libs: &[String],
    ) -> Self {
        let mut names: Vec<(&String, &Option<String>)> = defines.iter().collect();
        names.sort_by(|a, b| a.0.cmp(b.0));
        let defines = names
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => CcFlag::Define(format!("{key}={value}")),
                None => CcFlag::Define(key.clone()),
            })
            .collect();
        let include_dirs = include_paths.iter().cloned().map(CcFlag::IncludeDir).collect();
        let mut link_flags: CcFlags = link_paths.iter().cloned().map(CcFlag::LibDir).collect();
        link_flags.extend(libs.iter().cloned().map(CcFlag::Lib));
        Self { defines, include_dirs, link_flags }
    }
}

/// Asks `pkg-config` for `library`.
pub fn find_system_install(library: &str) -> Result<SystemInstall, pkg_config::Error> {
    let found = pkg_config::Config::new().cargo_metadata(false).env_metadata(false).probe(library)?;
    log::info!("found system {library} {} via pkg-config", found.version);
    Ok(SystemInstall::from_parts(&found.include_paths, &found.defines, &found.link_paths, &found.libs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defines_sorted_and_valued() {
        let defines = HashMap::from([
            ("ENGINE_SMALLBIG".to_string(), None),
            ("ENGINE_GZIP".to_string(), Some("1".to_string())),
        ]);
        let install = SystemInstall::from_parts(&[], &defines, &[], &[]);
        assert_eq!(install.defines.to_args(), vec!["-DENGINE_GZIP=1", "-DENGINE_SMALLBIG"]);
        assert!(install.include_dirs.is_empty());
        assert!(install.link_flags.is_empty());
    }

    #[test]
    fn link_dirs_precede_libs() {
        let install = SystemInstall::from_parts(
            &[PathBuf::from("inc")],
            &HashMap::new(),
            &[PathBuf::from("lib")],
            &["engine".to_string(), "m".to_string()],
        );
        assert_eq!(install.include_dirs.to_args(), vec!["-Iinc"]);
        assert_eq!(install.link_flags.to_args(), vec!["-Llib", "-lengine", "-lm"]);
    }

    #[test]
    fn missing_library_fails() {
        assert!(find_system_install("mpi-shim-no-such-library-xyz").is_err());
    }
}
