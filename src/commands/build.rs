//! Build command
//!
//! Build the extension modules declared in `simdstr.toml`

use anyhow::{Context, Result};
use simdstr::extensions::resolve_tool;
use simdstr::{
    BuildConfig, BuildDriver, BuildProfile, BuildResult, Config, Manifest, ToolchainFlags,
    env_vars, paths, platform,
};
use std::path::{Path, PathBuf};

/// Options for the build command
#[derive(Debug, Clone, Default)]
pub(crate) struct BuildOptions {
    pub(crate) extensions: Vec<String>,
    pub(crate) manifest: Option<String>,
    pub(crate) build_temp: Option<String>,
    pub(crate) build_lib: Option<String>,
    pub(crate) interpreter: Option<String>,
    pub(crate) cmake: Option<String>,
    pub(crate) rpath: Vec<String>,
    pub(crate) origin_rpath: bool,
    pub(crate) debug_build: bool,
    pub(crate) jobs: Option<usize>,
    pub(crate) verbose: bool,
    pub(crate) json: bool,
    pub(crate) config_file: Option<String>,
    pub(crate) norc: bool,
}

/// Build the selected extensions, stopping at the first failure
pub(crate) fn run(options: &BuildOptions) -> Result<()> {
    let user_config = Config::load_with_options(options.config_file.as_deref(), options.norc)?;

    let manifest_path = options
        .manifest
        .as_ref()
        .map_or_else(paths::find_manifest, PathBuf::from);
    let manifest = Manifest::load(&manifest_path)?;
    let extensions = manifest.select(&options.extensions)?;

    let config = resolve_config(options, &manifest, &user_config);
    simdstr::debug!("build config: {config:?}");

    let driver = BuildDriver::new(config);
    let results = driver
        .build_all(&extensions)
        .with_context(|| format!("Failed to build {}", manifest.package.name))?;

    if options.json {
        println!("{}", render_json(&manifest, &results)?);
    } else {
        for result in &results {
            println!("Built {} -> {}", result.name, result.artifact.display());
        }
        let (count, duration) = BuildDriver::summarize(&results);
        println!(
            "Built {count} extension(s) in {:.2}s",
            duration.as_secs_f64()
        );
    }

    Ok(())
}

/// Resolve every build setting.
///
/// Priority: command line, manifest `[build]`, environment, user config,
/// default. Manifest paths are relative to the manifest; others to the
/// working directory. Both build directories come out absolute since the
/// toolchain runs inside `build_temp`.
pub(crate) fn resolve_config(
    options: &BuildOptions,
    manifest: &Manifest,
    user_config: &Config,
) -> BuildConfig {
    let build = &manifest.build;

    let build_temp = options
        .build_temp
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| build.build_temp.as_deref().map(|p| manifest.resolve(p)))
        .or_else(|| env_vars::build_temp().map(PathBuf::from))
        .or_else(|| user_config.build_temp.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| manifest.resolve(Path::new("build/temp")));
    let build_temp = paths::absolute(&build_temp);

    let build_lib = options
        .build_lib
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| build.build_lib.as_deref().map(|p| manifest.resolve(p)))
        .or_else(|| user_config.build_lib.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| manifest.resolve(Path::new("build/lib")));
    let build_lib = paths::absolute(&build_lib);

    let cmake = resolve_tool(
        options.cmake.as_deref(),
        env_vars::cmake().or_else(|| user_config.cmake.clone()).as_deref(),
        &["cmake"],
    );
    let compiler = resolve_tool(
        None,
        env_vars::cc()
            .or_else(|| user_config.compiler.clone())
            .as_deref(),
        &["cc", "gcc", "clang"],
    );
    let interpreter = resolve_tool(
        options
            .interpreter
            .as_deref()
            .or(build.interpreter.as_deref()),
        env_vars::python()
            .or_else(|| user_config.interpreter.clone())
            .as_deref(),
        &["python3", "python"],
    );

    let ext_suffix = build
        .ext_suffix
        .clone()
        .or_else(|| interpreter.as_deref().and_then(platform::detect_ext_suffix))
        .unwrap_or_else(|| platform::default_ext_suffix().to_string());

    let profile = if options.debug_build {
        BuildProfile::Debug
    } else {
        build.profile.unwrap_or_default()
    };

    let jobs = options
        .jobs
        .or(build.jobs)
        .or_else(env_vars::build_parallel_level)
        .or(user_config.jobs);

    let mut config = BuildConfig::new(build_temp, build_lib);
    config.cmake = cmake;
    config.compiler = compiler;
    config.interpreter = interpreter;
    config.ext_suffix = ext_suffix;
    config.rpath = build
        .rpath
        .iter()
        .chain(&options.rpath)
        .cloned()
        .collect();
    config.origin_rpath = options.origin_rpath || build.origin_rpath.unwrap_or(false);
    config.profile = profile;
    config.jobs = jobs;
    config.flags = ToolchainFlags::from_env();
    config.verbose = options.verbose;
    config
}

fn render_json(manifest: &Manifest, results: &[BuildResult]) -> Result<String> {
    let extensions: Vec<serde_json::Value> = results
        .iter()
        .map(|result| {
            serde_json::json!({
                "name": result.name,
                "artifact": result.artifact.display().to_string(),
                "duration_secs": result.duration.as_secs_f64(),
            })
        })
        .collect();
    let report = serde_json::json!({
        "package": manifest.package.name,
        "version": manifest.package.version,
        "extensions": extensions,
    });
    serde_json::to_string_pretty(&report).context("Failed to serialize build report")
}
