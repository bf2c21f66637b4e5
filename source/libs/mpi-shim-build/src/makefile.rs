// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reading and rewriting simple variable assignments in engine makefiles.
//!
//! Only `NAME = value` on a single line is understood. Anything fancier
//! (`+=`, `:=`, continuation lines, repeated definitions) is reported
//! instead of guessed at.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::flags::{CcFlag, CcFlags, WithoutSpace};

/// Problems locating or editing a variable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MakefileError {
    /// No line assigns the variable.
    #[error("no definition of `{0}`")]
    Missing(String),
    /// More than one line assigns the variable.
    #[error("`{0}` is defined more than once")]
    Duplicate(String),
    /// The assignment is not a plain `=`.
    #[error("`{name}` is not a simple assignment: {line}")]
    NotSimple {
        /// Variable name.
        name: String,
        /// The offending line.
        line: String,
    },
    /// The definition continues onto the next line.
    #[error("`{0}` uses a continued line")]
    Continued(String),
    /// A replacement value would turn into a continuation.
    #[error("value for `{0}` ends with a backslash")]
    TrailingBackslash(String),
}

/// A makefile held as lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Makefile {
    lines: Vec<String>,
}

impl Makefile {
    /// Reads every line from `reader`.
    pub fn parse<R: BufRead>(reader: R) -> io::Result<Self> {
        Ok(Self { lines: reader.lines().collect::<io::Result<_>>()? })
    }

    /// Builds a makefile from in-memory text.
    pub fn parse_str(text: &str) -> Self {
        Self { lines: text.lines().map(str::to_string).collect() }
    }

    /// Writes the lines back out, one per line.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for line in &self.lines {
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }

    /// Right-hand side of `name = ...`, untrimmed.
    pub fn var_text(&self, name: &str) -> Result<&str, MakefileError> {
        let (line, col) = self.locate(name)?;
        Ok(&self.lines[line][col..])
    }

    /// Replaces the right-hand side of `name = ...`.
    pub fn set_var_text(&mut self, name: &str, text: &str) -> Result<(), MakefileError> {
        if text.ends_with('\\') {
            return Err(MakefileError::TrailingBackslash(name.to_string()));
        }
        let (line, col) = self.locate(name)?;
        let line = &mut self.lines[line];
        line.truncate(col);
        if !text.is_empty() {
            line.push(' ');
            line.push_str(text);
        }
        Ok(())
    }

    /// Parses the variable's value as flags.
    pub fn var_flags(&self, name: &str) -> Result<CcFlags, MakefileError> {
        self.var_text(name).map(CcFlags::parse)
    }

    /// Replaces the variable's value with `flags`.
    pub fn set_var_flags<I>(&mut self, name: &str, flags: I) -> Result<(), MakefileError>
    where
        I: IntoIterator<Item = CcFlag>,
    {
        let text = flags.into_iter().map(|flag| WithoutSpace(flag).to_string()).collect::<Vec<_>>();
        self.set_var_text(name, &text.join(" "))
    }

    /// Concatenates the flags of several variables, in order.
    pub fn gather_flags(&self, names: &[&str]) -> Result<CcFlags, MakefileError> {
        let mut flags = CcFlags::default();
        for name in names {
            flags.extend(self.var_flags(name)?);
        }
        Ok(flags)
    }

    fn locate(&self, name: &str) -> Result<(usize, usize), MakefileError> {
        let mut matches = self.lines.iter().enumerate().filter(|(_, line)| {
            line.starts_with(name)
                && line.len() > name.len()
                && !is_identifier_byte(line.as_bytes()[name.len()])
        });
        let (index, line) = matches.next().ok_or_else(|| MakefileError::Missing(name.to_string()))?;
        if matches.next().is_some() {
            return Err(MakefileError::Duplicate(name.to_string()));
        }

        let not_simple = || MakefileError::NotSimple { name: name.to_string(), line: line.clone() };
        let eq = line.find('=').ok_or_else(not_simple)?;
        if line[..eq].trim() != name {
            return Err(not_simple());
        }
        if line.ends_with('\\') {
            return Err(MakefileError::Continued(name.to_string()));
        }
        Ok((index, eq + 1))
    }
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# engine makefile
CC =\t\tmpicxx
ENGINE_INC =\t-DENGINE_GZIP
MPI_INC =       -I../STUBS
MPI_INC2 = -I/nowhere
MPI_PATH = -L../STUBS
MPI_LIB = -lmpi_stubs
EXTRA += -O3
";

    #[test]
    fn reads_value_after_equals() {
        let mk = Makefile::parse_str(SAMPLE);
        assert_eq!(mk.var_text("CC").unwrap().trim(), "mpicxx");
        assert_eq!(mk.var_flags("MPI_INC").unwrap().to_args(), vec!["-I../STUBS"]);
    }

    #[test]
    fn longer_names_do_not_shadow() {
        let mk = Makefile::parse_str(SAMPLE);
        assert_eq!(mk.var_text("MPI_INC2").unwrap().trim(), "-I/nowhere");
    }

    #[test]
    fn gather_in_order() {
        let mk = Makefile::parse_str(SAMPLE);
        let flags = mk.gather_flags(&["MPI_PATH", "MPI_LIB"]).unwrap();
        assert_eq!(flags.to_args(), vec!["-L../STUBS", "-lmpi_stubs"]);
    }

    #[test]
    fn rewrite_keeps_other_lines() {
        let mut mk = Makefile::parse_str(SAMPLE);
        let mut defs = mk.var_flags("ENGINE_INC").unwrap();
        defs.push(CcFlag::Define("ENGINE_EXCEPTIONS".into()));
        mk.set_var_flags("ENGINE_INC", defs).unwrap();

        let mut out = Vec::new();
        mk.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("ENGINE_INC = -DENGINE_GZIP -DENGINE_EXCEPTIONS\n"));
        assert!(text.starts_with("# engine makefile\nCC =\t\tmpicxx\n"));
    }

    #[test]
    fn rejects_unsupported_definitions() {
        let mk = Makefile::parse_str(SAMPLE);
        assert_eq!(mk.var_text("NOPE"), Err(MakefileError::Missing("NOPE".into())));
        assert!(matches!(mk.var_text("EXTRA"), Err(MakefileError::NotSimple { .. })));

        let dup = Makefile::parse_str("A = 1\nA = 2\n");
        assert_eq!(dup.var_text("A"), Err(MakefileError::Duplicate("A".into())));

        let cont = Makefile::parse_str("A = 1 \\\n  2\n");
        assert_eq!(cont.var_text("A"), Err(MakefileError::Continued("A".into())));
    }

    #[test]
    fn empty_value_leaves_bare_assignment() {
        let mut mk = Makefile::parse_str(SAMPLE);
        mk.set_var_text("MPI_LIB", "").unwrap();
        assert_eq!(mk.var_text("MPI_LIB").unwrap(), "");

        let mut out = Vec::new();
        mk.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\nMPI_LIB =\nEXTRA"));
    }

    #[test]
    fn refuses_trailing_backslash_value() {
        let mut mk = Makefile::parse_str("A = 1\n");
        assert_eq!(
            mk.set_var_text("A", "2 \\"),
            Err(MakefileError::TrailingBackslash("A".into()))
        );
    }
}
