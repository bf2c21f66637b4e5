// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: MPI communicator handle for the engine bindings, with or without system MPI
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable
//! TEST_COVERAGE: Unit tests per module, placeholder integration tests
//!
//! PUBLIC API:
//!   - MPI_Comm: real handle (`system-mpi`) or zero-sized placeholder
//!   - engine_open: engine entry point taking a communicator, or an empty enum
//!   - Launch: serial vs communicator launch selector
//!   - CArgs: owned argc/argv for C entry points
//!   - Error: argument conversion errors
//!
//! DEPENDENCIES:
//!   - mpi-sys (optional): real `MPI_Comm` and `RSMPI_COMM_WORLD`
//!   - thiserror: error derive
//!
//! FEATURES:
//!   - `system-mpi`: link against the system MPI and expose the real handle
//!   - `exceptions`: forwarded to the engine build as a define
//!
//! Exactly one definition of [`MPI_Comm`] is visible in any build. Code
//! that names the handle compiles in both configurations; code that would
//! need a live handle without `system-mpi` is statically unreachable.

#![cfg_attr(not(feature = "system-mpi"), forbid(unsafe_code))]
#![deny(clippy::all, missing_docs)]

#[cfg(all(feature = "system-mpi", not(mpi_backend = "system")))]
compile_error!("mpi_backend: build script did not select 'system' for the system-mpi feature");

#[cfg(all(not(feature = "system-mpi"), not(mpi_backend = "placeholder")))]
compile_error!("mpi_backend: build script did not select 'placeholder'");

mod args;
mod comm;
mod entry;
mod error;

pub use args::CArgs;
pub use comm::{world, Backend, MPI_Comm, BACKEND, FAKE_INCLUDE_DIR};
pub use entry::{engine_open, CommArg, CommUnavailable, Launch};
pub use error::{Error, Result};
