//! Declarative descriptors for workspace members
//!
//! A descriptor says *what* one unit of the workspace looks like - its files,
//! its package.json scripts, the commands to run after its files exist. The
//! materializer and orchestrator consume descriptors; nothing here touches
//! the filesystem.

use crate::error::{Result, ScaffoldError};
use crate::orchestrate::ExternalCommand;
use crate::templates::TemplateRef;
use std::collections::{BTreeMap, HashSet};
use std::path::{Component, PathBuf};

/// The two app flavors `monoforge app` can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppKind {
    /// Next.js app, generated by create-next-app during orchestration.
    Next,
    /// TypeScript Node service materialized from templates.
    Node,
}

impl AppKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            AppKind::Next => "Next.js",
            AppKind::Node => "Node.js",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    /// Files written directly at the project root (manifests, turbo.json).
    WorkspaceRoot,
    /// A shared package under `packages/`.
    Package,
    /// An app under `apps/`.
    App(AppKind),
}

/// One unit to materialize: a package, an app, or the workspace root files.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub name: String,
    pub kind: DescriptorKind,
    /// Directory relative to the project root; empty for the workspace root.
    pub relative_dir: PathBuf,
    /// Files to write, relative to `relative_dir`, in insertion order.
    pub files: Vec<(PathBuf, TemplateRef)>,
    /// package.json scripts for this member (also threaded into its
    /// manifest template as a parameter).
    pub scripts: BTreeMap<String, String>,
    /// Commands to run after materialization, in order.
    pub post_create: Vec<ExternalCommand>,
}

impl Descriptor {
    /// Member directories must sit exactly one level under `packages/` or
    /// `apps/`, matching the descriptor kind.
    fn check_confinement(&self) -> Result<()> {
        let expected = match self.kind {
            DescriptorKind::WorkspaceRoot => return Ok(()),
            DescriptorKind::Package => "packages",
            DescriptorKind::App(_) => "apps",
        };

        let mut components = self.relative_dir.components();
        let confined = matches!(
            (components.next(), components.next(), components.next()),
            (Some(Component::Normal(first)), Some(Component::Normal(_)), None)
                if first == expected
        );
        if confined {
            Ok(())
        } else {
            Err(ScaffoldError::PathEscape(self.relative_dir.clone()))
        }
    }
}

/// The whole workspace: root files plus an ordered list of members.
#[derive(Debug, Clone)]
pub struct WorkspaceDescriptor {
    pub name: String,
    /// Root-level files (kind `WorkspaceRoot`).
    pub root: Descriptor,
    pub members: Vec<Descriptor>,
}

impl WorkspaceDescriptor {
    /// Enforce the structural invariants before anything touches disk:
    /// members unique by (kind, name), member dirs confined under
    /// `packages/`/`apps/`, and no two descriptors writing the same path.
    pub fn validate(&self) -> Result<()> {
        let mut seen_members = HashSet::new();
        for member in &self.members {
            if !seen_members.insert((member.kind, member.name.clone())) {
                return Err(ScaffoldError::DuplicateMember(member.name.clone()));
            }
            member.check_confinement()?;
        }

        let mut seen_paths = HashSet::new();
        for descriptor in std::iter::once(&self.root).chain(self.members.iter()) {
            for (relative, _) in &descriptor.files {
                let full = descriptor.relative_dir.join(relative);
                if !seen_paths.insert(full.clone()) {
                    return Err(ScaffoldError::DuplicateDestination(full));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(name: &str, dir: &str, files: &[&str]) -> Descriptor {
        Descriptor {
            name: name.to_string(),
            kind: DescriptorKind::Package,
            relative_dir: PathBuf::from(dir),
            files: files
                .iter()
                .map(|f| (PathBuf::from(f), TemplateRef::bare("workspace/gitignore")))
                .collect(),
            scripts: BTreeMap::new(),
            post_create: Vec::new(),
        }
    }

    fn workspace(members: Vec<Descriptor>) -> WorkspaceDescriptor {
        WorkspaceDescriptor {
            name: "demo".to_string(),
            root: Descriptor {
                name: "demo".to_string(),
                kind: DescriptorKind::WorkspaceRoot,
                relative_dir: PathBuf::new(),
                files: Vec::new(),
                scripts: BTreeMap::new(),
                post_create: Vec::new(),
            },
            members,
        }
    }

    #[test]
    fn test_duplicate_members_rejected() {
        let ws = workspace(vec![
            package("db", "packages/db", &["package.json"]),
            package("db", "packages/db-two", &["index.js"]),
        ]);
        assert!(matches!(
            ws.validate(),
            Err(ScaffoldError::DuplicateMember(name)) if name == "db"
        ));
    }

    #[test]
    fn test_same_name_different_kind_is_fine() {
        let mut app = package("web", "apps/web", &["package.json"]);
        app.kind = DescriptorKind::App(AppKind::Node);
        let ws = workspace(vec![package("web", "packages/web", &["index.js"]), app]);
        assert!(ws.validate().is_ok());
    }

    #[test]
    fn test_member_outside_packages_rejected() {
        let ws = workspace(vec![package("evil", "tools/evil", &["x"])]);
        assert!(matches!(ws.validate(), Err(ScaffoldError::PathEscape(_))));
    }

    #[test]
    fn test_member_nested_too_deep_rejected() {
        let ws = workspace(vec![package("deep", "packages/a/b", &["x"])]);
        assert!(matches!(ws.validate(), Err(ScaffoldError::PathEscape(_))));
    }

    #[test]
    fn test_duplicate_destination_rejected() {
        let ws = workspace(vec![
            package("a", "packages/shared", &["package.json"]),
            package("b", "packages/shared", &["package.json"]),
        ]);
        assert!(matches!(
            ws.validate(),
            Err(ScaffoldError::DuplicateDestination(_))
        ));
    }
}
