// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Build plan resolution.
//!
//! A plan fixes, for one build, which `MPI_Comm` definition is live, where
//! the engine library comes from, which flags reach the C side and what the
//! build script must print for cargo.

use core::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::ShimConfig;
use crate::directive::Directive;
use crate::env::{EnvSource, Tracked};
use crate::flags::{CcFlag, CcFlags, RustLibFlags};
use crate::include::{prepend_include_path, INCLUDE_PATH_VAR};
use crate::lines::read_simple_lines;
use crate::makefile::Makefile;
use crate::mode::SourceMode;
use crate::symbols::MPI_SYMBOL_PATTERN;
use crate::system::{find_system_install, PKG_CONFIG_ENV};
use crate::{Error, Result};

/// Cfg carrying the selected backend into the compiled crate.
pub const BACKEND_CFG: &str = "mpi_backend";
/// Compile-time variable naming the placeholder include directory.
pub const FAKE_INCLUDE_ENV: &str = "MPI_SHIM_FAKE_INCLUDE";
/// Define forwarded to the engine when the `exceptions` feature is on.
pub const EXCEPTIONS_DEFINE: &str = "ENGINE_EXCEPTIONS";

/// Which `MPI_Comm` definition a build uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// The system MPI library's handle.
    System,
    /// The zero-sized stand-in plus the fake `mpi.h`.
    Placeholder,
}

impl Backend {
    /// Value of the `mpi_backend` cfg.
    pub const fn name(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Placeholder => "placeholder",
        }
    }

    /// Every value the `mpi_backend` cfg may take.
    pub const ALL: [Backend; 2] = [Backend::System, Backend::Placeholder];
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cargo features relevant to planning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Features {
    /// `system-mpi`: use the real communicator handle.
    pub system_mpi: bool,
    /// `exceptions`: forward [`EXCEPTIONS_DEFINE`].
    pub exceptions: bool,
}

impl Features {
    /// Reads `CARGO_FEATURE_*` as set by cargo for build scripts.
    pub fn from_cargo_env(env: &impl EnvSource) -> Result<Self> {
        Ok(Self {
            system_mpi: env.var("CARGO_FEATURE_SYSTEM_MPI")?.is_some(),
            exceptions: env.var("CARGO_FEATURE_EXCEPTIONS")?.is_some(),
        })
    }
}

/// Resolved decisions for one build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildPlan {
    /// Live `MPI_Comm` definition.
    pub backend: Backend,
    /// Engine library source.
    pub mode: SourceMode,
    /// `pkg-config` package that satisfied the build, if one was found.
    pub system_library: Option<String>,
    /// Engine header to bind against.
    pub header: String,
    /// `-D` flags for the C side.
    pub defines: CcFlags,
    /// `-I` flags for the C side; the placeholder directory comes first.
    pub include_dirs: CcFlags,
    /// `-L`/`-l` flags for rustc.
    pub link_flags: CcFlags,
    /// Type patterns kept out of generated bindings.
    pub blocklist_types: Vec<String>,
    /// Functions kept out of generated bindings.
    pub blocklist_functions: Vec<String>,
    /// Placeholder `mpi.h` directory, placeholder backend only.
    pub fake_include: Option<PathBuf>,
    /// New `C_INCLUDE_PATH` value, placeholder backend only.
    pub include_path_override: Option<String>,
    rerun_files: Vec<PathBuf>,
    rerun_env: Vec<String>,
}

impl BuildPlan {
    /// Resolves a plan.
    ///
    /// `manifest_dir` anchors relative paths from the configuration.
    /// `config_path` is watched for changes when given and present on disk;
    /// cargo treats a watched file that does not exist as always stale.
    ///
    /// When the mode allows a system install and `[engine] pkg_config` names a
    /// package, `pkg-config` is asked first. In [`SourceMode::Auto`] a miss
    /// falls back to the makefile; in [`SourceMode::SystemOnly`] it is
    /// an [`Error::NotInstalled`].
    pub fn resolve<E: EnvSource>(
        config: &ShimConfig,
        config_path: Option<&Path>,
        features: Features,
        env: E,
        manifest_dir: &Path,
    ) -> Result<Self> {
        let env = Tracked::new(env);
        let backend = if features.system_mpi { Backend::System } else { Backend::Placeholder };

        let source_var = config.env.source_var.as_str();
        let mode = SourceMode::parse(source_var, env.get_nonempty(source_var)?.as_deref())?;
        log::info!("mpi backend: {backend}, engine source: {mode}");

        let mut rerun_files: Vec<PathBuf> =
            config_path.filter(|path| path.exists()).map(Path::to_path_buf).into_iter().collect();
        for var in &config.env.rerun {
            env.note(var);
        }
        if let Some(list) = &config.env.rerun_file {
            let path = manifest_dir.join(list);
            let file = File::open(&path).map_err(|source| Error::Read { path: path.clone(), source })?;
            let vars = read_simple_lines(BufReader::new(file), "#")
                .map_err(|source| Error::Read { path: path.clone(), source })?;
            vars.iter().for_each(|var| env.note(var));
            rerun_files.push(path);
        }

        let mut defines: CcFlags = config.engine.defines.iter().cloned().map(CcFlag::Define).collect();
        if features.exceptions {
            defines.push(CcFlag::Define(EXCEPTIONS_DEFINE.to_string()));
        }

        let mut include_dirs = CcFlags::default();
        let mut link_flags: CcFlags = config
            .engine
            .link_search
            .iter()
            .map(|dir| CcFlag::LibDir(manifest_dir.join(dir)))
            .collect();
        if let Some(lib) = &config.engine.link_lib {
            link_flags.push(CcFlag::Lib(lib.clone()));
        }

        let mut system_library = None;
        if let Some(library) = config.engine.pkg_config.as_ref().filter(|_| mode.allows_system()) {
            PKG_CONFIG_ENV.iter().for_each(|var| env.note(var));
            match find_system_install(library) {
                Ok(install) => {
                    defines.extend(install.defines);
                    include_dirs.extend(install.include_dirs);
                    link_flags.extend(install.link_flags);
                    system_library = Some(library.clone());
                }
                Err(source) if mode == SourceMode::SystemOnly => {
                    return Err(Error::NotInstalled { library: library.clone(), source });
                }
                Err(err) => log::info!("no system {library} ({err}); building from source"),
            }
        }

        match &config.engine.makefile {
            Some(makefile) if system_library.is_none() && mode.allows_build() => {
                let path = manifest_dir.join(makefile);
                let (compile, link) = makefile_flags(config, &path)?;
                for flag in compile {
                    match flag {
                        CcFlag::Define(_) => defines.push(flag),
                        CcFlag::IncludeDir(_) => include_dirs.push(flag),
                        other => log::debug!("ignoring compile flag {}", crate::WithoutSpace(&other)),
                    }
                }
                for flag in link {
                    if flag.is_link_flag() {
                        link_flags.push(flag);
                    } else {
                        log::warn!("dropping non-link flag {} from makefile", crate::WithoutSpace(&flag));
                    }
                }
                rerun_files.push(path);
            }
            Some(makefile) => {
                log::debug!("engine comes from a system install; not reading {}", makefile.display());
            }
            None => {}
        }

        let (fake_include, include_path_override, blocklist_types) = match backend {
            Backend::System => (None, None, Vec::new()),
            Backend::Placeholder => {
                let fake = manifest_dir.join(&config.mpi.fake_include);
                let existing = env.get(INCLUDE_PATH_VAR)?;
                let joined = prepend_include_path(&fake, existing.as_deref())?;
                include_dirs.0.insert(0, CcFlag::IncludeDir(fake.clone()));
                rerun_files.push(fake.join("mpi.h"));
                (Some(fake), Some(joined), vec![MPI_SYMBOL_PATTERN.to_string()])
            }
        };

        Ok(Self {
            backend,
            mode,
            system_library,
            header: config.engine.header.clone(),
            defines,
            include_dirs,
            link_flags,
            blocklist_types,
            blocklist_functions: vec![config.engine.entry.clone()],
            fake_include,
            include_path_override,
            rerun_files,
            rerun_env: env.seen(),
        })
    }

    /// Files whose change should rebuild the crate.
    pub fn rerun_files(&self) -> &[PathBuf] {
        &self.rerun_files
    }

    /// Environment variables whose change should rebuild the crate.
    pub fn rerun_env(&self) -> &[String] {
        &self.rerun_env
    }

    /// Compiler arguments for tools parsing the engine header.
    pub fn clang_args(&self) -> Vec<String> {
        let mut args = self.defines.to_args();
        args.extend(self.include_dirs.to_args());
        args
    }

    /// Everything the build script prints, in order.
    pub fn directives(&self) -> Vec<Directive> {
        let mut out: Vec<Directive> =
            self.rerun_files.iter().cloned().map(Directive::RerunIfChanged).collect();
        out.extend(self.rerun_env.iter().cloned().map(Directive::RerunIfEnvChanged));
        out.push(Directive::RustcCheckCfg {
            name: BACKEND_CFG.to_string(),
            values: Backend::ALL.iter().map(|b| b.name().to_string()).collect(),
        });
        out.push(Directive::RustcCfg {
            name: BACKEND_CFG.to_string(),
            value: Some(self.backend.name().to_string()),
        });
        if let Some(fake) = &self.fake_include {
            out.push(Directive::RustcEnv {
                key: FAKE_INCLUDE_ENV.to_string(),
                value: fake.display().to_string(),
            });
        }
        if !self.link_flags.is_empty() {
            out.push(Directive::RustcFlags(RustLibFlags(&self.link_flags).to_string()));
        }
        if self.backend == Backend::System && self.mode == SourceMode::BuildOnly {
            out.push(Directive::Warning(
                "building the engine from source against system MPI; make sure both use the same MPI"
                    .to_string(),
            ));
        }
        out
    }
}

fn makefile_flags(config: &ShimConfig, path: &Path) -> Result<(CcFlags, CcFlags)> {
    let file = File::open(path).map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
    let makefile = Makefile::parse(BufReader::new(file))
        .map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
    let gather = |vars: &[String]| {
        let names: Vec<&str> = vars.iter().map(String::as_str).collect();
        makefile
            .gather_flags(&names)
            .map_err(|source| Error::Makefile { path: path.to_path_buf(), source })
    };
    let base = path.parent().unwrap_or(Path::new("."));
    let compile = gather(&config.engine.include_vars)?.make_paths_absolute(base);
    let link = gather(&config.engine.lib_vars)?.make_paths_absolute(base);
    log::debug!("makefile {}: compile [{compile}] link [{link}]", path.display());
    Ok((compile, link))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;

    const NO_SUCH_PACKAGE: &str = "mpi-shim-no-such-package";

    fn resolve(features: Features, env: MapEnv) -> Result<BuildPlan> {
        BuildPlan::resolve(&ShimConfig::default(), None, features, env, Path::new("/crate"))
    }

    fn probing_config(extra: &str) -> ShimConfig {
        ShimConfig::parse_str(&format!("[engine]\npkg_config = \"{NO_SUCH_PACKAGE}\"\n{extra}")).unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn placeholder_without_system_mpi() {
        let plan = resolve(Features::default(), MapEnv::new()).unwrap();
        assert_eq!(plan.backend, Backend::Placeholder);
        assert_eq!(plan.mode, SourceMode::Auto);
        assert!(plan.system_library.is_none());
        assert_eq!(plan.fake_include, Some(PathBuf::from("/crate/include/fake-system")));
        assert_eq!(plan.include_path_override.as_deref(), Some("/crate/include/fake-system"));
        assert_eq!(plan.blocklist_types, vec![MPI_SYMBOL_PATTERN]);
        assert_eq!(plan.blocklist_functions, vec!["engine_open"]);
        assert_eq!(plan.clang_args(), vec!["-I/crate/include/fake-system"]);
        assert_eq!(plan.rerun_env(), &["MPI_SHIM_SOURCE".to_string(), "C_INCLUDE_PATH".to_string()]);
    }

    #[test]
    fn system_mpi_leaves_include_path_alone() {
        let features = Features { system_mpi: true, exceptions: true };
        let env = MapEnv::new().with("MPI_SHIM_SOURCE", "system").with("C_INCLUDE_PATH", "/x");
        let plan = resolve(features, env).unwrap();
        assert_eq!(plan.backend, Backend::System);
        assert_eq!(plan.mode, SourceMode::SystemOnly);
        assert!(plan.fake_include.is_none());
        assert!(plan.include_path_override.is_none());
        assert!(plan.blocklist_types.is_empty());
        assert_eq!(plan.defines.to_args(), vec!["-DENGINE_EXCEPTIONS"]);
        assert_eq!(plan.rerun_env(), &["MPI_SHIM_SOURCE".to_string()]);
    }

    #[test]
    fn bad_source_mode_fails() {
        let err = resolve(Features::default(), MapEnv::new().with("MPI_SHIM_SOURCE", "nope"))
            .unwrap_err();
        assert!(matches!(err, Error::BadMode { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn directives_carry_backend_cfg() {
        let plan = resolve(Features::default(), MapEnv::new()).unwrap();
        let lines: Vec<String> = plan.directives().iter().map(ToString::to_string).collect();
        assert!(lines.contains(&"cargo::rustc-cfg=mpi_backend=\"placeholder\"".to_string()));
        assert!(lines.contains(
            &"cargo::rustc-check-cfg=cfg(mpi_backend, values(\"system\", \"placeholder\"))".to_string()
        ));
        assert!(lines
            .contains(&"cargo::rustc-env=MPI_SHIM_FAKE_INCLUDE=/crate/include/fake-system".to_string()));
        assert!(lines.contains(&"cargo::rerun-if-changed=/crate/include/fake-system/mpi.h".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("cargo::rustc-flags")));
    }

    #[cfg(unix)]
    #[test]
    fn configured_link_lib_reaches_rustc_flags() {
        let config = ShimConfig::parse_str("[engine]\nlink_lib = \"engine\"\nlink_search = [\"lib\"]\n")
            .unwrap();
        let plan =
            BuildPlan::resolve(&config, None, Features::default(), MapEnv::new(), Path::new("/crate"))
                .unwrap();
        assert!(plan.directives().contains(&Directive::RustcFlags("-L /crate/lib -l engine".to_string())));
    }

    #[test]
    fn absent_config_file_is_not_watched() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("shim.toml");
        let plan = BuildPlan::resolve(
            &ShimConfig::default(),
            Some(&config_path),
            Features::default(),
            MapEnv::new(),
            dir.path(),
        )
        .unwrap();
        assert!(!plan.rerun_files().contains(&config_path));
        assert!(!plan.directives().contains(&Directive::RerunIfChanged(config_path)));
    }

    #[test]
    fn present_config_file_is_watched_first() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("shim.toml");
        std::fs::write(&config_path, "").unwrap();
        let plan = BuildPlan::resolve(
            &ShimConfig::default(),
            Some(&config_path),
            Features::default(),
            MapEnv::new(),
            dir.path(),
        )
        .unwrap();
        assert_eq!(plan.directives()[0], Directive::RerunIfChanged(config_path));
    }

    #[test]
    fn auto_falls_back_without_system_install() {
        let config = probing_config("link_lib = \"engine\"\n");
        let plan =
            BuildPlan::resolve(&config, None, Features::default(), MapEnv::new(), Path::new("/crate"))
                .unwrap();
        assert_eq!(plan.mode, SourceMode::Auto);
        assert!(plan.system_library.is_none());
        assert_eq!(plan.link_flags.to_args(), vec!["-lengine"]);
        for var in PKG_CONFIG_ENV {
            assert!(plan.rerun_env().iter().any(|seen| seen == var), "{var}");
        }
    }

    #[test]
    fn system_only_requires_system_install() {
        let err = BuildPlan::resolve(
            &probing_config(""),
            None,
            Features::default(),
            MapEnv::new().with("MPI_SHIM_SOURCE", "system"),
            Path::new("/crate"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotInstalled { ref library, .. } if library == NO_SUCH_PACKAGE));
        assert!(err.to_string().starts_with(&format!("system {NO_SUCH_PACKAGE} not found")));
    }

    #[test]
    fn build_only_skips_pkg_config() {
        let plan = BuildPlan::resolve(
            &probing_config(""),
            None,
            Features::default(),
            MapEnv::new().with("MPI_SHIM_SOURCE", "build"),
            Path::new("/crate"),
        )
        .unwrap();
        assert!(plan.system_library.is_none());
        assert!(!plan.rerun_env().iter().any(|var| var.starts_with("PKG_CONFIG")));
    }
}
