//! External tool detection
//!
//! This module provides:
//! - Availability/version probes for the tools the generated workspace needs
//! - The best-effort pnpm version probe that stamps the workspace manifest

pub mod check;

pub use check::{
    check_docker, check_git, check_node, check_pnpm, check_tools, package_manager_field,
    pnpm_bin, ToolInfo, FALLBACK_PNPM_VERSION,
};
