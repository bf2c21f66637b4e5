// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! C compiler, preprocessor and linker flags.
//!
//! Flags are collected from makefiles and configuration, then rendered
//! either as separate arguments for a compiler invocation or in the
//! `-l name` form that `cargo::rustc-flags` expects.

use core::fmt;
use std::borrow::Borrow;
use std::path::{Path, PathBuf};

/// One flag for the C compiler or linker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CcFlag {
    /// `-DNAME` or `-DNAME=VALUE`.
    Define(String),
    /// `-Ipath`.
    IncludeDir(PathBuf),
    /// `-Lpath`.
    LibDir(PathBuf),
    /// `-lname`.
    Lib(String),
    /// Anything else, kept verbatim.
    ///
    /// An unknown option is assumed not to take the following token as
    /// its argument.
    Other(String),
}

impl CcFlag {
    fn fmt_with_space(&self, space: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncludeDir(path) => write!(f, "-I{space}{}", path.display()),
            Self::LibDir(path) => write!(f, "-L{space}{}", path.display()),
            Self::Lib(name) => write!(f, "-l{space}{name}"),
            Self::Define(def) => write!(f, "-D{space}{def}"),
            Self::Other(raw) => f.write_str(raw),
        }
    }

    /// Returns `true` for the flags a linker cares about.
    pub fn is_link_flag(&self) -> bool {
        matches!(self, Self::LibDir(_) | Self::Lib(_))
    }

    fn from_parts(prefix: &str, value: &str) -> Option<Self> {
        match prefix {
            "-D" => Some(Self::Define(value.to_string())),
            "-I" => Some(Self::IncludeDir(PathBuf::from(value))),
            "-L" => Some(Self::LibDir(PathBuf::from(value))),
            "-l" => Some(Self::Lib(value.to_string())),
            _ => None,
        }
    }
}

/// Displays as `-l iberty`.
pub struct WithSpace<C>(pub C);

impl<C: Borrow<CcFlag>> fmt::Display for WithSpace<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.borrow().fmt_with_space(" ", f)
    }
}

/// Displays as `-liberty`; one token per flag, safe to pass as a single argument.
pub struct WithoutSpace<C>(pub C);

impl<C: Borrow<CcFlag>> fmt::Display for WithoutSpace<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.borrow().fmt_with_space("", f)
    }
}

const PREFIXES: [&str; 4] = ["-D", "-I", "-L", "-l"];

/// Ordered list of flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CcFlags(pub Vec<CcFlag>);

impl CcFlags {
    /// Parses whitespace-separated flags. `-I dir` and `-Idir` are equivalent.
    pub fn parse(text: &str) -> Self {
        let mut flags = Vec::new();
        let mut tokens = text.split_whitespace();
        while let Some(token) = tokens.next() {
            let flag = match PREFIXES.iter().find(|p| token.starts_with(*p)) {
                Some(prefix) if token.len() == prefix.len() => match tokens.next() {
                    Some(value) => CcFlag::from_parts(prefix, value),
                    None => None,
                },
                Some(prefix) => CcFlag::from_parts(prefix, &token[prefix.len()..]),
                None => None,
            };
            flags.push(flag.unwrap_or_else(|| CcFlag::Other(token.to_string())));
        }
        Self(flags)
    }

    /// One argument per flag, in [`WithoutSpace`] form.
    pub fn to_args(&self) -> Vec<String> {
        self.0.iter().map(|flag| WithoutSpace(flag).to_string()).collect()
    }

    /// Resolves relative `-I` and `-L` paths against `base`.
    pub fn make_paths_absolute(&self, base: &Path) -> Self {
        let fix = |path: &PathBuf| if path.is_relative() { base.join(path) } else { path.clone() };
        Self(
            self.0
                .iter()
                .map(|flag| match flag {
                    CcFlag::IncludeDir(path) => CcFlag::IncludeDir(fix(path)),
                    CcFlag::LibDir(path) => CcFlag::LibDir(fix(path)),
                    other => other.clone(),
                })
                .collect(),
        )
    }

    /// Appends a flag.
    pub fn push(&mut self, flag: CcFlag) {
        self.0.push(flag);
    }

    /// Iterates over the flags.
    pub fn iter(&self) -> std::slice::Iter<'_, CcFlag> {
        self.0.iter()
    }

    /// Number of flags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no flags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CcFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, flag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", WithoutSpace(flag))?;
        }
        Ok(())
    }
}

impl FromIterator<CcFlag> for CcFlags {
    fn from_iter<T: IntoIterator<Item = CcFlag>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<CcFlag> for CcFlags {
    fn extend<T: IntoIterator<Item = CcFlag>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for CcFlags {
    type Item = CcFlag;
    type IntoIter = std::vec::IntoIter<CcFlag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CcFlags {
    type Item = &'a CcFlag;
    type IntoIter = std::slice::Iter<'a, CcFlag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Renders the `-L`/`-l` subset in the spaced form used by `cargo::rustc-flags`.
///
/// Other flags are skipped; rustc rejects them there.
pub struct RustLibFlags<'a>(pub &'a CcFlags);

impl fmt::Display for RustLibFlags<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for flag in self.0.iter().filter(|flag| flag.is_link_flag()) {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}", WithSpace(flag))?;
        }
        Ok(())
    }
}
