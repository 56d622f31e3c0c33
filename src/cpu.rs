//! CPU feature detection and backend selection
//!
//! Detection runs once per process (like platform detection) and the result is
//! reused by every search call.

use std::fmt;
use std::sync::LazyLock;

static FEATURES: LazyLock<CpuFeatures> = LazyLock::new(CpuFeatures::probe);

static BACKEND: LazyLock<Backend> = LazyLock::new(|| {
    if crate::env_vars::force_scalar() {
        crate::debug!("SIMDSTR_FORCE_SCALAR set, using scalar kernels");
        return Backend::Scalar;
    }
    Backend::best_for(CpuFeatures::detect())
});

/// SIMD instruction sets relevant to the search kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuFeatures {
    pub sse2: bool,
    pub ssse3: bool,
    pub sse41: bool,
    pub avx2: bool,
    pub avx512bw: bool,
}

impl CpuFeatures {
    /// Features of the running CPU (cached)
    #[must_use]
    pub fn detect() -> Self {
        *FEATURES
    }

    #[cfg(target_arch = "x86_64")]
    fn probe() -> Self {
        Self {
            sse2: is_x86_feature_detected!("sse2"),
            ssse3: is_x86_feature_detected!("ssse3"),
            sse41: is_x86_feature_detected!("sse4.1"),
            avx2: is_x86_feature_detected!("avx2"),
            avx512bw: is_x86_feature_detected!("avx512bw"),
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn probe() -> Self {
        Self::default()
    }

    /// Feature names in detection order, for display
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.sse2, "sse2"),
            (self.ssse3, "ssse3"),
            (self.sse41, "sse4.1"),
            (self.avx2, "avx2"),
            (self.avx512bw, "avx512bw"),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect()
    }
}

/// Kernel family used by the single-needle searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// 256-bit AVX2 kernels
    Avx2,
    /// Portable byte-at-a-time kernels
    Scalar,
}

impl Backend {
    /// Backend selected for this process.
    ///
    /// AVX2 when the CPU supports it, unless `SIMDSTR_FORCE_SCALAR` is set.
    #[must_use]
    pub fn detect() -> Self {
        *BACKEND
    }

    /// Best backend a CPU with `features` can run
    #[must_use]
    pub const fn best_for(features: CpuFeatures) -> Self {
        if features.avx2 { Self::Avx2 } else { Self::Scalar }
    }

    /// The backend that will actually run on this CPU.
    ///
    /// Asking for AVX2 on a CPU without it yields `Scalar`.
    #[must_use]
    pub fn effective(self) -> Self {
        match self {
            Self::Avx2 if CpuFeatures::detect().avx2 => Self::Avx2,
            _ => Self::Scalar,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Avx2 => "avx2",
            Self::Scalar => "scalar",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
