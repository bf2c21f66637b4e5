// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Build-script support for the mpi-shim crate
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: Unit tests per module, plan integration tests
//!
//! PUBLIC API:
//!   - BuildPlan::resolve(): decide backend, source mode, flags and directives
//!   - ShimConfig: `shim.toml` schema
//!   - SourceMode: where the engine library comes from
//!   - CcFlag/CcFlags: C compiler flag parsing and rendering
//!   - Makefile: simple variable editing for engine makefiles
//!   - Directive: cargo build-script output lines
//!   - SystemInstall: flags of a system engine found through pkg-config
//!
//! DEPENDENCIES:
//!   - serde + toml: configuration
//!   - log: diagnostics
//!   - pkg-config: system install discovery
//!   - regex: MPI symbol matching
//!   - thiserror: error derive
//!
//! INVARIANTS:
//!   - Exactly one backend is selected per plan
//!   - Every environment variable consulted is reported for rerun

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]

pub mod config;
pub mod directive;
pub mod env;
mod error;
pub mod flags;
pub mod include;
pub mod lines;
pub mod makefile;
pub mod mode;
pub mod plan;
pub mod symbols;
pub mod system;

pub use config::ShimConfig;
pub use directive::Directive;
pub use env::{EnvSource, MapEnv, ProcessEnv, Tracked};
pub use error::{Error, Result};
pub use flags::{CcFlag, CcFlags, RustLibFlags, WithSpace, WithoutSpace};
pub use makefile::{Makefile, MakefileError};
pub use mode::SourceMode;
pub use plan::{Backend, BuildPlan, Features};
pub use system::SystemInstall;
