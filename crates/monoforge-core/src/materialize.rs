//! Directory materialization: validate-all-then-write-all
//!
//! Every destination is resolved, checked for confinement and collisions,
//! and every template rendered *before* the first byte hits disk, so a bad
//! path or template can never leave a half-written descriptor behind.

use crate::descriptor::{Descriptor, DescriptorKind, WorkspaceDescriptor};
use crate::error::{Result, ScaffoldError};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Paths written by a materialization, root-relative, in the insertion
/// order of each descriptor's file set.
#[derive(Debug, Default)]
pub struct MaterializeResult {
    pub written: Vec<PathBuf>,
}

/// Resolve `relative` against `root`, rejecting anything that would land
/// outside it. Purely lexical: `..` components pop within the root and fail
/// once they would climb past it; absolute components always fail.
pub fn confine(root: &Path, relative: &Path) -> Result<PathBuf> {
    let mut resolved = root.to_path_buf();
    let mut depth: usize = 0;

    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(ScaffoldError::PathEscape(relative.to_path_buf()));
                }
                resolved.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ScaffoldError::PathEscape(relative.to_path_buf()));
            }
        }
    }

    Ok(resolved)
}

/// Materialize one descriptor under `root`.
///
/// Member descriptors (packages and apps) additionally require that their own
/// directory does not exist yet - that keeps generator-owned apps with empty
/// file sets from being regenerated over, and makes re-running `app` fail
/// loudly instead of merging. Intermediate directories are idempotent.
pub async fn materialize(root: &Path, descriptor: &Descriptor) -> Result<MaterializeResult> {
    let member_dir = confine(root, &descriptor.relative_dir)?;
    if descriptor.kind != DescriptorKind::WorkspaceRoot && member_dir.exists() {
        return Err(ScaffoldError::DestinationExists(member_dir));
    }

    // Plan phase: resolve every path and render every template first.
    let mut plan: Vec<(PathBuf, PathBuf, String)> = Vec::new();
    for (relative, template) in &descriptor.files {
        let root_relative = descriptor.relative_dir.join(relative);
        let target = confine(root, &root_relative)?;
        if target.exists() {
            return Err(ScaffoldError::DestinationExists(target));
        }
        let content = template.render()?;
        plan.push((target, root_relative, content));
    }

    // Write phase: nothing below can collide or escape anymore.
    let mut result = MaterializeResult::default();
    for (target, root_relative, content) in plan {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, content).await?;
        result.written.push(root_relative);
    }

    Ok(result)
}

/// Materialize a whole workspace: validate the descriptor invariants, create
/// the project root (which must not exist), then write root files and each
/// member in order.
pub async fn materialize_workspace(
    root: &Path,
    workspace: &WorkspaceDescriptor,
) -> Result<MaterializeResult> {
    workspace.validate()?;

    if root.exists() {
        return Err(ScaffoldError::DestinationExists(root.to_path_buf()));
    }
    fs::create_dir_all(root).await?;

    let mut result = materialize(root, &workspace.root).await?;
    for member in &workspace.members {
        let mut member_result = materialize(root, member).await?;
        result.written.append(&mut member_result.written);
    }

    Ok(result)
}
