// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Build script selecting the MPI communicator backend
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable
//! TEST_COVERAGE: Covered by mpi-shim-build plan tests
//!
//! PUBLIC API:
//!   - main(): Build script entry point
//!
//! DEPENDENCIES:
//!   - mpi-shim-build: plan resolution and cargo directives
//!   - shim.toml: optional build configuration next to Cargo.toml

use std::path::PathBuf;

use mpi_shim_build::{BuildPlan, Features, ProcessEnv, ShimConfig};

fn main() {
    let manifest_dir = PathBuf::from(
        std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| panic!("missing env var CARGO_MANIFEST_DIR")),
    );
    let config_path = manifest_dir.join("shim.toml");
    let config = ShimConfig::load_or_default(&config_path).unwrap_or_else(|err| panic!("{err}"));
    let features = Features::from_cargo_env(&ProcessEnv).unwrap_or_else(|err| panic!("{err}"));

    let plan = BuildPlan::resolve(&config, Some(&config_path), features, ProcessEnv, &manifest_dir)
        .unwrap_or_else(|err| panic!("mpi-shim build plan: {err}"));
    for directive in plan.directives() {
        directive.emit();
    }
}
