//! Monoforge Core - scaffolding engine for pnpm/Turborepo monorepos
//!
//! This library turns declarative package/app descriptors into real files and
//! directories, then sequences the external tools (package manager, web
//! generator, schema CLI, formatter, VCS) that finish setting a workspace up.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Pure template rendering, descriptor
//!   validation, file materialization, command orchestration, tool probes
//! - **Layer 2: Topology** - The built-in `init` workspace layout and per-app
//!   descriptors, plus the command sequences that follow materialization
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts
//!   (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompt module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use monoforge_core::{materialize, topology};
//!
//! let root = std::env::current_dir()?.join("demo-app");
//! let workspace = topology::workspace_descriptor("demo-app", "pnpm@9.0.0", &root)?;
//! let result = materialize::materialize_workspace(&root, &workspace).await?;
//! println!("wrote {} files", result.written.len());
//! ```

pub mod descriptor;
pub mod error;
pub mod materialize;
pub mod orchestrate;
pub mod runtime;
pub mod templates;
pub mod topology;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use descriptor::{AppKind, Descriptor, DescriptorKind, WorkspaceDescriptor};
pub use error::{Result, ScaffoldError};
pub use materialize::{materialize, materialize_workspace, MaterializeResult};
pub use orchestrate::{CommandFailure, ExternalCommand, OrchestrationResult};
pub use runtime::check::FALLBACK_PNPM_VERSION;
pub use templates::{render, TemplateParams, TemplateRef};
