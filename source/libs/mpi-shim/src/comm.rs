// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Communicator handle selection.

use core::fmt;

/// Which definition of [`MPI_Comm`] this build exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// `mpi_sys::MPI_Comm` from the system MPI library.
    System,
    /// Zero-sized stand-in; no communicator can exist.
    Placeholder,
}

impl Backend {
    /// Stable lowercase name, matching the `mpi_backend` cfg value.
    pub const fn name(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Placeholder => "placeholder",
        }
    }

    /// Returns `true` when a real communicator can be obtained.
    pub const fn is_system(self) -> bool {
        matches!(self, Self::System)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "system-mpi")]
pub use mpi_sys::MPI_Comm;

/// Stand-in for the MPI communicator handle when `system-mpi` is off.
///
/// Occupies the name so signatures mentioning the handle still type-check.
/// It has no members and no operations, and it cannot be built outside
/// this crate:
///
/// ```compile_fail
/// let comm = mpi_shim::MPI_Comm { _opaque: [], _marker: core::marker::PhantomData };
/// ```
#[cfg(not(feature = "system-mpi"))]
#[allow(non_camel_case_types)]
#[repr(C)]
pub struct MPI_Comm {
    _opaque: [u8; 0],
    _marker: core::marker::PhantomData<(*mut u8, core::marker::PhantomPinned)>,
}

/// Backend compiled into this build.
#[cfg(feature = "system-mpi")]
pub const BACKEND: Backend = Backend::System;
/// Backend compiled into this build.
#[cfg(not(feature = "system-mpi"))]
pub const BACKEND: Backend = Backend::Placeholder;

/// Directory holding the placeholder `mpi.h`, for C tooling that parses
/// engine headers. `None` when the system header is in use.
#[cfg(feature = "system-mpi")]
pub const FAKE_INCLUDE_DIR: Option<&str> = None;
/// Directory holding the placeholder `mpi.h`, for C tooling that parses
/// engine headers. `None` when the system header is in use.
#[cfg(not(feature = "system-mpi"))]
pub const FAKE_INCLUDE_DIR: Option<&str> = Some(env!("MPI_SHIM_FAKE_INCLUDE"));

/// Returns the world communicator, if this build has one.
///
/// MPI must already be initialised before the handle is used.
#[cfg(feature = "system-mpi")]
pub fn world() -> Option<MPI_Comm> {
    // SAFETY: RSMPI_COMM_WORLD is an immutable handle exported by mpi-sys.
    Some(unsafe { mpi_sys::RSMPI_COMM_WORLD })
}

/// Returns the world communicator, if this build has one.
#[cfg(not(feature = "system-mpi"))]
pub fn world() -> Option<MPI_Comm> {
    None
}
