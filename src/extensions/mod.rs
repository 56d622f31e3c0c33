//! Native extension building
//!
//! Compiles extension modules (C code loaded into a host interpreter) into
//! shared libraries placed where the interpreter's importer finds them.
//!
//! Supported strategies:
//! - `CMake` projects (`CMakeLists.txt`, configure + build)
//! - Direct compilation of listed sources with the C compiler

pub mod artifact;
pub mod builder;
pub mod cmake_extension;
pub mod direct_extension;
pub mod toolchain;
pub mod types;

pub use builder::BuildDriver;
pub use cmake_extension::CMakeExtensionBuilder;
pub use direct_extension::DirectExtensionBuilder;
pub use toolchain::{find_program, resolve_tool};
pub use types::{
    BuildConfig, BuildError, BuildProfile, BuildResult, BuildStep, BuildStrategy,
    ExtensionDescriptor, ToolchainFlags,
};
