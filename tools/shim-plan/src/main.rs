// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: mpi-shim build plan inspector
//! INTENT: Show what the mpi-shim build script would decide for a configuration
//! DEPS: mpi-shim-build (plan resolution), env_logger (RUST_LOG diagnostics)
//! READINESS: Host tool; no service dependencies
//! TESTS: Help text; placeholder plan output; usage errors

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use mpi_shim_build::{BuildPlan, Features, ProcessEnv, ShimConfig};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Returns the CLI usage string.
fn help() -> &'static str {
    "shim-plan prints the mpi-shim build plan.\n\
     Usage: shim-plan [--config PATH] [--manifest-dir DIR] [--system-mpi] [--exceptions] [--help]"
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    config: Option<PathBuf>,
    manifest_dir: Option<PathBuf>,
    features: Features,
    help: bool,
}

fn parse_args(args: &[&str]) -> CliResult<Options> {
    let mut opts = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "--help" | "-h" => opts.help = true,
            "--system-mpi" => opts.features.system_mpi = true,
            "--exceptions" => opts.features.exceptions = true,
            "--config" => {
                let path = iter.next().ok_or_else(|| usage("missing path after --config"))?;
                opts.config = Some(PathBuf::from(path));
            }
            "--manifest-dir" => {
                let dir = iter.next().ok_or_else(|| usage("missing directory after --manifest-dir"))?;
                opts.manifest_dir = Some(PathBuf::from(dir));
            }
            other => return Err(usage(&format!("unknown argument `{other}`"))),
        }
    }
    Ok(opts)
}

fn usage(msg: &str) -> Box<dyn std::error::Error> {
    format!("{msg}\n{}", help()).into()
}

/// Resolves and renders the plan for `args`.
fn execute(args: &[&str]) -> CliResult<String> {
    let opts = parse_args(args)?;
    if opts.help {
        return Ok(help().to_string());
    }

    let config = match &opts.config {
        Some(path) => ShimConfig::load_or_default(path)?,
        None => ShimConfig::default(),
    };
    let manifest_dir = match (&opts.manifest_dir, &opts.config) {
        (Some(dir), _) => dir.clone(),
        (None, Some(path)) => path.parent().unwrap_or(Path::new(".")).to_path_buf(),
        (None, None) => env::current_dir()?,
    };
    log::debug!("resolving against {}", manifest_dir.display());

    let plan =
        BuildPlan::resolve(&config, opts.config.as_deref(), opts.features, ProcessEnv, &manifest_dir)?;
    Ok(render(&plan))
}

fn render(plan: &BuildPlan) -> String {
    let mut out = vec![
        format!("backend: {}", plan.backend),
        format!("mode: {}", plan.mode),
        format!("header: {}", plan.header),
        format!("clang-args: {}", plan.clang_args().join(" ")),
        format!("blocklist-functions: {}", plan.blocklist_functions.join(", ")),
    ];
    if let Some(library) = &plan.system_library {
        out.push(format!("system-library: {library}"));
    }
    if !plan.blocklist_types.is_empty() {
        out.push(format!("blocklist-types: {}", plan.blocklist_types.join(", ")));
    }
    if let Some(path) = &plan.include_path_override {
        out.push(format!("{}={path}", mpi_shim_build::include::INCLUDE_PATH_VAR));
    }
    out.extend(plan.directives().iter().map(ToString::to_string));
    out.join("\n")
}

fn main() -> ExitCode {
    env_logger::init();
    let owned: Vec<String> = env::args().skip(1).collect();
    let refs: Vec<&str> = owned.iter().map(|s| s.as_str()).collect();
    match execute(&refs) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("shim-plan: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_contains_name() {
        assert!(execute(&["--help"]).unwrap().contains("shim-plan"));
    }

    #[test]
    fn flags_set_features() {
        let opts = parse_args(&["--system-mpi", "--exceptions", "--config", "shim.toml"]).unwrap();
        assert!(opts.features.system_mpi && opts.features.exceptions);
        assert_eq!(opts.config, Some(PathBuf::from("shim.toml")));
    }

    #[test]
    fn unknown_argument_is_usage_error() {
        let err = execute(&["--frobnicate"]).unwrap_err();
        assert!(err.to_string().contains("unknown argument `--frobnicate`"));
        assert!(parse_args(&["--config"]).is_err());
    }

    #[test]
    fn placeholder_plan_from_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("shim.toml");
        std::fs::write(&config, "[engine]\nheader = \"sim/library.h\"\n").unwrap();
        let config = config.to_str().unwrap().to_string();

        let text = execute(&["--config", &config]).unwrap();
        assert!(text.contains("backend: placeholder"));
        assert!(text.contains("header: sim/library.h"));
        assert!(text.contains("blocklist-functions: engine_open"));
        assert!(text.contains("cargo::rustc-cfg=mpi_backend=\"placeholder\""));
    }

    #[test]
    fn system_plan_has_no_fake_include() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().to_str().unwrap().to_string();
        let text = execute(&["--system-mpi", "--manifest-dir", &manifest]).unwrap();
        assert!(text.contains("backend: system"));
        assert!(!text.contains("MPI_SHIM_FAKE_INCLUDE"));
        assert!(!text.contains("blocklist-types"));
    }
}
