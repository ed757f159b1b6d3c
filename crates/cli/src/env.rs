// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All environment variables read or exported by deploycheck are defined
//! here. Use these accessors instead of calling `std::env::var()` directly.

/// Generated env var name constants.
mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

// Re-export name constants for callers that need the raw name string.
pub use names::*;

use std::path::PathBuf;

/// `DEPLOYCHECK_BUILDPACK_BASE`: Buildpack substituted for the `default` sentinel.
pub fn buildpack_base() -> Option<String> {
    var_non_empty(names::DEPLOYCHECK_BUILDPACK_BASE)
}

/// `DEPLOYCHECK_DEFAULT_STACK`: Target platform stack.
pub fn default_stack() -> Option<String> {
    var_non_empty(names::DEPLOYCHECK_DEFAULT_STACK)
}

/// `DEPLOYCHECK_CONFIG`: Harness config file path.
pub fn config_path() -> Option<PathBuf> {
    var_non_empty(names::DEPLOYCHECK_CONFIG).map(PathBuf::from)
}

fn var_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
