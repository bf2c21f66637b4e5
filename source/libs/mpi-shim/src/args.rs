// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Owned `argc`/`argv` for engine entry points.

use std::os::raw::{c_char, c_int};
use std::ptr;

use crate::{Error, Result};

/// Program name plus arguments, stored as NUL-terminated byte strings.
///
/// Pointers returned by [`CArgs::argv_mut`] stay valid until the value is
/// dropped or `argv_mut` is called again.
#[derive(Debug)]
pub struct CArgs {
    strings: Vec<Box<[u8]>>,
    argc: c_int,
    ptrs: Vec<*mut c_char>,
}

impl CArgs {
    /// Builds an argument vector with `program` at index 0.
    pub fn new<I, S>(program: &str, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut strings = vec![to_c_bytes(0, program)?];
        for (offset, arg) in args.into_iter().enumerate() {
            strings.push(to_c_bytes(offset + 1, arg.as_ref())?);
        }
        let argc = to_argc(strings.len())?;
        Ok(Self { strings, argc, ptrs: Vec::new() })
    }

    /// Number of entries, program name included.
    pub fn argc(&self) -> c_int {
        self.argc
    }

    /// Null-terminated pointer array suitable for a C `char **argv`.
    pub fn argv_mut(&mut self) -> *mut *mut c_char {
        self.ptrs.clear();
        self.ptrs.extend(self.strings.iter_mut().map(|s| s.as_mut_ptr().cast::<c_char>()));
        self.ptrs.push(ptr::null_mut());
        self.ptrs.as_mut_ptr()
    }

    /// Iterates over the entries without their trailing NUL.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.strings.iter().map(|s| &s[..s.len() - 1])
    }
}

fn to_argc(len: usize) -> Result<c_int> {
    c_int::try_from(len).map_err(|_| Error::TooManyArgs(len))
}

fn to_c_bytes(index: usize, arg: &str) -> Result<Box<[u8]>> {
    if arg.as_bytes().contains(&0) {
        return Err(Error::InteriorNul { index });
    }
    let mut bytes = Vec::with_capacity(arg.len() + 1);
    bytes.extend_from_slice(arg.as_bytes());
    bytes.push(0);
    Ok(bytes.into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn program_name_comes_first() {
        let args = CArgs::new("engine", ["-in", "in.melt"]).unwrap();
        assert_eq!(args.argc(), 3);
        let collected: Vec<&[u8]> = args.iter().collect();
        assert_eq!(collected, vec![&b"engine"[..], &b"-in"[..], &b"in.melt"[..]]);
    }

    #[test]
    fn argv_is_null_terminated() {
        let mut args = CArgs::new("engine", Vec::<String>::new()).unwrap();
        let argv = args.argv_mut();
        assert!(!argv.is_null());
        assert_eq!(args.ptrs.len(), 2);
        assert!(args.ptrs[1].is_null());
        assert_eq!(args.ptrs[0], args.strings[0].as_ptr() as *mut c_char);
    }

    #[test]
    fn interior_nul_reports_index() {
        let err = CArgs::new("engine", ["ok", "bad\0arg"]).unwrap_err();
        assert_eq!(err, Error::InteriorNul { index: 2 });
        let err = CArgs::new("en\0gine", ["ok"]).unwrap_err();
        assert_eq!(err, Error::InteriorNul { index: 0 });
    }

    #[test]
    fn argc_beyond_c_int_is_rejected() {
        let max = c_int::MAX as usize;
        assert_eq!(to_argc(max), Ok(c_int::MAX));
        assert_eq!(to_argc(max + 1), Err(Error::TooManyArgs(max + 1)));
        assert_eq!(to_argc(usize::MAX), Err(Error::TooManyArgs(usize::MAX)));
    }

    proptest! {
        #[test]
        fn argc_counts_program_and_args(args in proptest::collection::vec("[a-z0-9./-]{0,12}", 0..8)) {
            let built = CArgs::new("engine", &args).unwrap();
            prop_assert_eq!(built.argc() as usize, args.len() + 1);
            for (entry, arg) in built.iter().skip(1).zip(&args) {
                prop_assert_eq!(entry, arg.as_bytes());
            }
        }
    }
}
