//! simdstr command-line interface
//!
//! SIMD string search from the command line, and the build driver for the
//! extension modules that expose it to other languages.

use clap::{Parser, Subcommand};
use std::process;

/// Display an error with optional backtrace information
fn display_error(err: &anyhow::Error, backtrace_enabled: bool) {
    eprintln!("error: {err}");

    // Show error chain
    let mut source = err.source();
    while let Some(err) = source {
        eprintln!("caused by: {err}");
        source = err.source();
    }

    // Show backtrace if enabled
    if backtrace_enabled {
        let backtrace = err.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            eprintln!("\nBacktrace:");
            eprintln!("{backtrace}");
        }
    }
}

#[derive(Parser)]
#[command(name = "simdstr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "SIMD string search and extension build driver", long_about = None)]
#[command(disable_version_flag = true)]
pub(crate) struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    _version: Option<bool>,

    /// Print debug output to stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Show stack backtrace on errors
    #[arg(long, global = true)]
    backtrace: bool,

    /// Config file path (overrides default)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Avoid loading any config file
    #[arg(long, global = true)]
    norc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the extension modules declared in simdstr.toml
    Build {
        /// Extensions to build (builds all if not specified)
        extensions: Vec<String>,

        /// Path to simdstr.toml
        #[arg(long)]
        manifest: Option<String>,

        /// Temporary build directory
        #[arg(long)]
        build_temp: Option<String>,

        /// Output directory for built extensions
        #[arg(long)]
        build_lib: Option<String>,

        /// Interpreter the extensions are built for
        #[arg(long)]
        interpreter: Option<String>,

        /// `CMake` executable
        #[arg(long)]
        cmake: Option<String>,

        /// Add a runtime library search path (repeatable)
        #[arg(long)]
        rpath: Vec<String>,

        /// Search the extension's own directory for libraries at runtime
        #[arg(long)]
        origin_rpath: bool,

        /// Build with debug info and no optimization
        #[arg(long)]
        debug_build: bool,

        /// Number of parallel build jobs
        #[arg(long, short = 'j')]
        jobs: Option<usize>,

        /// Show build progress and toolchain output
        #[arg(long)]
        verbose: bool,

        /// Print results as JSON
        #[arg(long, conflicts_with = "verbose")]
        json: bool,
    },

    /// Find a substring (prints its position, or -1)
    Find {
        /// Substring to search for
        needle: String,

        /// File to search (reads stdin if not specified)
        file: Option<String>,

        /// Ignore ASCII case
        #[arg(long, short = 'i')]
        ignore_case: bool,

        /// Print every non-overlapping position
        #[arg(long, conflicts_with = "count")]
        all: bool,

        /// Print the number of non-overlapping occurrences
        #[arg(long)]
        count: bool,

        /// Use the portable scalar search
        #[arg(long)]
        scalar: bool,

        /// Needle offsets compared by the vector filter
        #[arg(long, num_args = 2, value_names = ["FIRST", "SECOND"])]
        anchors: Option<Vec<usize>>,
    },

    /// Search for several patterns at once (prints `start end pattern`)
    Multi {
        /// Pattern to search for (repeatable)
        #[arg(long = "pattern", short = 'p', required = true)]
        patterns: Vec<String>,

        /// File to search (reads stdin if not specified)
        file: Option<String>,

        /// Teddy flavor
        #[arg(long, value_enum, default_value_t = commands::multi::FlavorArg::Auto)]
        flavor: commands::multi::FlavorArg,

        /// Number of leading pattern bytes fingerprinted (1-4)
        #[arg(long)]
        masks: Option<usize>,

        /// Print every non-overlapping match
        #[arg(long)]
        all: bool,

        /// Use the portable scalar search
        #[arg(long)]
        scalar: bool,
    },

    /// Compare search backends on a file
    Bench {
        /// Substring to search for
        needle: String,

        /// File to search
        file: String,

        /// Iterations per backend
        #[arg(long, short = 'n', default_value_t = 100)]
        iterations: usize,

        /// Ignore ASCII case
        #[arg(long, short = 'i')]
        ignore_case: bool,
    },

    /// Show detected CPU features and selected backends
    Features,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize debug mode
    simdstr::init_debug(cli.debug);

    let result = match cli.command {
        Commands::Build {
            extensions,
            manifest,
            build_temp,
            build_lib,
            interpreter,
            cmake,
            rpath,
            origin_rpath,
            debug_build,
            jobs,
            verbose,
            json,
        } => {
            let options = commands::build::BuildOptions {
                extensions,
                manifest,
                build_temp,
                build_lib,
                interpreter,
                cmake,
                rpath,
                origin_rpath,
                debug_build,
                jobs,
                verbose,
                json,
                config_file: cli.config,
                norc: cli.norc,
            };
            commands::build::run(&options)
        }
        Commands::Find {
            needle,
            file,
            ignore_case,
            all,
            count,
            scalar,
            anchors,
        } => {
            let options = commands::find::FindOptions {
                ignore_case,
                all,
                count,
                scalar,
                anchors: anchors.and_then(|a| Some((*a.first()?, *a.get(1)?))),
            };
            commands::find::run(&needle, file.as_deref(), &options)
        }
        Commands::Multi {
            patterns,
            file,
            flavor,
            masks,
            all,
            scalar,
        } => {
            let options = commands::multi::MultiOptions {
                flavor,
                masks,
                all,
                scalar,
            };
            commands::multi::run(&patterns, file.as_deref(), &options)
        }
        Commands::Bench {
            needle,
            file,
            iterations,
            ignore_case,
        } => commands::bench::run(&needle, &file, iterations, ignore_case),
        Commands::Features => commands::features::run(),
        Commands::Completion { shell } => commands::completion::run(shell),
    };

    if let Err(e) = result {
        // Display error with formatting
        display_error(&e, cli.backtrace);
        process::exit(1);
    }
}

mod commands;
