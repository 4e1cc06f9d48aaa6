// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # rlds-observability
//!
//! Logging infrastructure shared by the RLDS dataset mod crates and tools.
//!
//! Provides per-crate debug flags (`--debug-<crate>`, `RLDS_MOD_DEBUG`) and a
//! single `tracing` subscriber setup with text or JSON output.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "rlds-structures",
    "rlds-mod-functions",
    "rlds-config",
    "rlds-observability",
    "rlds-dataset-mod",
];
