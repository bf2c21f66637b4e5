// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Engine entry point that consumes a communicator, and its substitute.
//!
//! With `system-mpi` the engine's `engine_open` is declared as a foreign
//! function. Without it the same name is an empty enum, so any call site
//! fails to compile instead of reaching a placeholder handle at run time.

use crate::comm::{self, MPI_Comm};

#[cfg(feature = "system-mpi")]
use std::os::raw::{c_char, c_int, c_void};

#[cfg(feature = "system-mpi")]
extern "C" {
    /// Opens an engine instance whose processes are `communicator`.
    ///
    /// `handle` receives the opaque instance pointer. MPI must be
    /// initialised and the engine library linked before calling this.
    pub fn engine_open(
        argc: c_int,
        argv: *mut *mut c_char,
        communicator: MPI_Comm,
        handle: *mut *mut c_void,
    );
}

/// Stands in for the engine's communicator entry point. Has no values.
#[cfg(not(feature = "system-mpi"))]
#[allow(non_camel_case_types)]
pub enum engine_open {}

/// Uninhabited marker filling communicator slots when MPI is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommUnavailable {}

/// What [`Launch::Communicator`] carries in this build.
#[cfg(feature = "system-mpi")]
pub type CommArg = MPI_Comm;
/// What [`Launch::Communicator`] carries in this build.
#[cfg(not(feature = "system-mpi"))]
pub type CommArg = CommUnavailable;

/// How an engine instance should be started.
pub enum Launch {
    /// Single process, no communicator.
    Serial,
    /// Spread over the processes of a communicator.
    Communicator(CommArg),
}

impl Launch {
    /// Uses the world communicator when this build has one.
    #[cfg(feature = "system-mpi")]
    pub fn from_world() -> Self {
        match comm::world() {
            Some(world) => Self::Communicator(world),
            None => Self::Serial,
        }
    }

    /// Uses the world communicator when this build has one.
    #[cfg(not(feature = "system-mpi"))]
    pub fn from_world() -> Self {
        debug_assert!(comm::world().is_none());
        Self::Serial
    }

    /// Returns `true` if starting this launch needs a live communicator.
    pub fn requires_comm(&self) -> bool {
        matches!(self, Self::Communicator(_))
    }

    /// Short label for logs.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Communicator(_) => "communicator",
        }
    }

    /// Borrows the communicator, if any.
    #[cfg(feature = "system-mpi")]
    pub fn comm(&self) -> Option<&MPI_Comm> {
        match self {
            Self::Serial => None,
            Self::Communicator(comm) => Some(comm),
        }
    }

    /// Borrows the communicator, if any.
    #[cfg(not(feature = "system-mpi"))]
    pub fn comm(&self) -> Option<&MPI_Comm> {
        match self {
            Self::Serial => None,
            Self::Communicator(never) => match *never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "system-mpi"))]
    #[test]
    fn placeholder_launch_is_serial() {
        let launch = Launch::from_world();
        assert!(!launch.requires_comm());
        assert_eq!(launch.describe(), "serial");
        assert!(launch.comm().is_none());
    }

    #[cfg(not(feature = "system-mpi"))]
    #[test]
    fn substitutes_are_uninhabited() {
        assert_eq!(core::mem::size_of::<engine_open>(), 0);
        assert_eq!(core::mem::size_of::<CommUnavailable>(), 0);
        assert_eq!(core::mem::size_of::<Launch>(), 0);
    }

    #[test]
    fn serial_needs_no_comm() {
        assert!(Launch::Serial.comm().is_none());
        assert_eq!(Launch::Serial.describe(), "serial");
    }
}
