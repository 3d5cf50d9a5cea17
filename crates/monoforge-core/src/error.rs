//! Error taxonomy for scaffold operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating descriptors, rendering templates, or
/// materializing files on disk.
///
/// Filesystem and template errors are structural and always fatal to the
/// current operation; nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// The destination file (or a member's own directory) already exists.
    /// Generated output is never silently overwritten.
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// A resolved destination would land outside the project root.
    #[error("path escapes the project root: {0}")]
    PathEscape(PathBuf),

    /// The template id is not registered.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// A required interpolation key was absent.
    #[error("template `{template}` is missing required parameter `{param}`")]
    MissingParam {
        template: String,
        param: &'static str,
    },

    /// A parameter (or verified template output) was malformed.
    #[error("template `{template}`: invalid `{param}` content")]
    InvalidParam {
        template: String,
        param: &'static str,
    },

    /// Project and app names become directory and npm package names.
    #[error("invalid name `{0}`: use lowercase letters, digits and hyphens, starting with a letter")]
    InvalidName(String),

    /// Two workspace members share the same (kind, name).
    #[error("duplicate workspace member: {0}")]
    DuplicateMember(String),

    /// Two descriptors would write the same root-relative path.
    #[error("two descriptors write to the same path: {0}")]
    DuplicateDestination(PathBuf),

    /// `app` was run outside a directory tree containing pnpm-workspace.yaml.
    #[error("not inside a workspace: no pnpm-workspace.yaml found in this directory or any parent (run `monoforge init` first)")]
    WorkspaceNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;
