//! Features command
//!
//! Display CPU features and the search kernels they enable

use anyhow::Result;
use simdstr::{Backend, CpuFeatures, detect_current_platform, env_vars, platform};

/// Display detected CPU features and selected backends
#[allow(
    clippy::unnecessary_wraps,
    reason = "Maintains consistent API with other commands"
)]
pub(crate) fn run() -> Result<()> {
    let features = CpuFeatures::detect();
    let backend = Backend::detect();

    println!("Platform Information:");
    println!();
    println!("  Platform:      {}", detect_current_platform());
    println!("  Ext suffix:    {} (default)", platform::default_ext_suffix());
    println!();
    println!("CPU Features:");
    let names = features.names();
    if names.is_empty() {
        println!("  (none detected)");
    } else {
        println!("  {}", names.join(" "));
    }
    println!();
    println!("Backends:");
    println!("  Search:        {backend}");
    println!("  Teddy:         {}", teddy_kernels(features, backend));
    if env_vars::force_scalar() {
        println!("  (SIMDSTR_FORCE_SCALAR is set)");
    }

    Ok(())
}

/// Teddy kernels that run with `features` under `backend`
fn teddy_kernels(features: CpuFeatures, backend: Backend) -> String {
    if backend != Backend::Avx2 {
        return "scalar".to_string();
    }
    let kernels: Vec<&str> = [(features.ssse3, "slim (ssse3)"), (features.avx2, "fat (avx2)")]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect();
    if kernels.is_empty() {
        "scalar".to_string()
    } else {
        kernels.join(", ")
    }
}
