//! Common test utilities and helpers
//!
//! This module provides shared functionality used across integration tests:
//! - Binary path resolution (via `get_simdstr_binary`)
//! - Fixture utilities: manifests, project directories, fake toolchains (via `helpers`)

pub(crate) mod helpers;

// Re-export get_simdstr_binary for convenient access
pub(crate) use helpers::get_simdstr_binary;
