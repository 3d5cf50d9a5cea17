//! Built-in workspace topology
//!
//! Which packages and apps `init` generates, the descriptors behind
//! `app <name>`, and the ordered external commands that finish setting a
//! materialized tree up.

use crate::descriptor::{AppKind, Descriptor, DescriptorKind, WorkspaceDescriptor};
use crate::error::{Result, ScaffoldError};
use crate::orchestrate::ExternalCommand;
use crate::runtime::check::pnpm_bin;
use crate::templates::{TemplateParams, TemplateRef};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// npm scope applied to every generated package and app.
pub const PACKAGE_SCOPE: &str = "@repo";

const TYPESCRIPT_VERSION: &str = "^5.4.5";
const PRISMA_VERSION: &str = "^5.14.0";
const BULLMQ_VERSION: &str = "^5.7.0";

/// Names become directories and npm package names, so they are checked
/// before any filesystem work: lowercase letters, digits, hyphens, leading
/// letter.
pub fn validate_project_name(name: &str) -> Result<()> {
    let well_formed = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if well_formed {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidName(name.to_string()))
    }
}

/// Development database name. Hyphens are not valid in Postgres
/// identifiers, so they become underscores.
pub fn dev_database_name(project: &str) -> String {
    format!("{}_dev", project.replace('-', "_"))
}

/// Walk ancestors of `start` looking for a pnpm workspace manifest.
pub fn find_workspace_root(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("pnpm-workspace.yaml").is_file())
        .map(Path::to_path_buf)
        .ok_or(ScaffoldError::WorkspaceNotFound)
}

fn scoped(name: &str) -> String {
    format!("{PACKAGE_SCOPE}/{name}")
}

fn script_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn map_json(map: &BTreeMap<String, String>) -> String {
    serde_json::to_string(map).expect("string maps always serialize")
}

fn pairs_json(pairs: &[(&str, &str)]) -> String {
    let map: BTreeMap<&str, &str> = pairs.iter().copied().collect();
    serde_json::to_string(&map).expect("string maps always serialize")
}

/// package.json template reference for a scoped member package.
fn manifest_ref(
    name: &str,
    scripts: &BTreeMap<String, String>,
    dependencies: &[(&str, &str)],
    dev_dependencies: &[(&str, &str)],
    main: Option<&str>,
) -> TemplateRef {
    let mut params = TemplateParams::new()
        .with("name", scoped(name))
        .with("scripts", map_json(scripts));
    if !dependencies.is_empty() {
        params = params.with("dependencies", pairs_json(dependencies));
    }
    if !dev_dependencies.is_empty() {
        params = params.with("dev_dependencies", pairs_json(dev_dependencies));
    }
    if let Some(main) = main {
        params = params.with("main", main);
    }
    TemplateRef::new("package/manifest", params)
}

fn typescript_config_package() -> Descriptor {
    let scripts = BTreeMap::new();
    Descriptor {
        name: "typescript-config".to_string(),
        kind: DescriptorKind::Package,
        relative_dir: PathBuf::from("packages/typescript-config"),
        files: vec![
            (
                PathBuf::from("package.json"),
                manifest_ref("typescript-config", &scripts, &[], &[], None),
            ),
            (PathBuf::from("base.json"), TemplateRef::bare("tsconfig/base.json")),
            (PathBuf::from("node.json"), TemplateRef::bare("tsconfig/node.json")),
        ],
        scripts,
        post_create: Vec::new(),
    }
}

fn eslint_config_package() -> Descriptor {
    let scripts = BTreeMap::new();
    Descriptor {
        name: "eslint-config".to_string(),
        kind: DescriptorKind::Package,
        relative_dir: PathBuf::from("packages/eslint-config"),
        files: vec![
            (
                PathBuf::from("package.json"),
                manifest_ref("eslint-config", &scripts, &[], &[], Some("index.js")),
            ),
            (PathBuf::from("index.js"), TemplateRef::bare("eslint/index.js")),
        ],
        scripts,
        post_create: Vec::new(),
    }
}

fn db_package(root: &Path) -> Descriptor {
    let scripts = script_map(&[
        ("db:generate", "prisma generate"),
        ("db:migrate", "prisma migrate dev"),
        ("db:push", "prisma db push"),
    ]);
    let pnpm = pnpm_bin();
    Descriptor {
        name: "db".to_string(),
        kind: DescriptorKind::Package,
        relative_dir: PathBuf::from("packages/db"),
        files: vec![
            (
                PathBuf::from("package.json"),
                manifest_ref(
                    "db",
                    &scripts,
                    &[("@prisma/client", PRISMA_VERSION)],
                    &[
                        ("@repo/typescript-config", "workspace:*"),
                        ("prisma", PRISMA_VERSION),
                        ("typescript", TYPESCRIPT_VERSION),
                    ],
                    Some("./src/index.ts"),
                ),
            ),
            (PathBuf::from("tsconfig.json"), TemplateRef::bare("package/tsconfig.json")),
            (PathBuf::from("prisma/schema.prisma"), TemplateRef::bare("db/schema.prisma")),
            (PathBuf::from("src/index.ts"), TemplateRef::bare("db/index.ts")),
        ],
        scripts,
        post_create: vec![ExternalCommand::new(
            &pnpm,
            &["--filter", "@repo/db", "exec", "prisma", "generate"],
            root,
        )],
    }
}

fn queue_package() -> Descriptor {
    let scripts = BTreeMap::new();
    Descriptor {
        name: "queue".to_string(),
        kind: DescriptorKind::Package,
        relative_dir: PathBuf::from("packages/queue"),
        files: vec![
            (
                PathBuf::from("package.json"),
                manifest_ref(
                    "queue",
                    &scripts,
                    &[("bullmq", BULLMQ_VERSION), ("ioredis", "^5.4.1")],
                    &[
                        ("@repo/typescript-config", "workspace:*"),
                        ("typescript", TYPESCRIPT_VERSION),
                    ],
                    Some("./src/index.ts"),
                ),
            ),
            (PathBuf::from("tsconfig.json"), TemplateRef::bare("package/tsconfig.json")),
            (PathBuf::from("src/index.ts"), TemplateRef::bare("queue/index.ts")),
        ],
        scripts,
        post_create: Vec::new(),
    }
}

fn docker_dev_package(project: &str) -> Descriptor {
    let scripts = script_map(&[
        ("dev", "docker compose -f compose.yml up"),
        ("stop", "docker compose -f compose.yml down"),
    ]);
    Descriptor {
        name: "docker-dev".to_string(),
        kind: DescriptorKind::Package,
        relative_dir: PathBuf::from("packages/docker-dev"),
        files: vec![
            (
                PathBuf::from("package.json"),
                manifest_ref("docker-dev", &scripts, &[], &[], None),
            ),
            (
                PathBuf::from("compose.yml"),
                TemplateRef::new(
                    "docker/compose.yml",
                    TemplateParams::new().with("db_name", dev_database_name(project)),
                ),
            ),
        ],
        scripts,
        post_create: Vec::new(),
    }
}

fn worker_app() -> Descriptor {
    let scripts = script_map(&[
        ("dev", "tsx watch src/index.ts"),
        ("build", "tsc"),
        ("start", "node dist/index.js"),
    ]);
    Descriptor {
        name: "worker".to_string(),
        kind: DescriptorKind::App(AppKind::Node),
        relative_dir: PathBuf::from("apps/worker"),
        files: vec![
            (
                PathBuf::from("package.json"),
                manifest_ref(
                    "worker",
                    &scripts,
                    &[
                        ("@repo/db", "workspace:*"),
                        ("@repo/queue", "workspace:*"),
                        ("bullmq", BULLMQ_VERSION),
                    ],
                    &[
                        ("@repo/typescript-config", "workspace:*"),
                        ("tsx", "^4.11.0"),
                        ("typescript", TYPESCRIPT_VERSION),
                    ],
                    None,
                ),
            ),
            (PathBuf::from("tsconfig.json"), TemplateRef::bare("package/tsconfig.json")),
            (PathBuf::from("src/index.ts"), TemplateRef::bare("worker/index.ts")),
        ],
        scripts,
        post_create: Vec::new(),
    }
}

/// The generator owns every file under the app directory, so the file set is
/// empty; the materializer still guards the directory against re-runs.
fn next_app(name: &str, root: &Path) -> Descriptor {
    Descriptor {
        name: name.to_string(),
        kind: DescriptorKind::App(AppKind::Next),
        relative_dir: PathBuf::from("apps").join(name),
        files: Vec::new(),
        scripts: BTreeMap::new(),
        post_create: vec![create_next_app_command(name, root)],
    }
}

fn node_app(name: &str) -> Descriptor {
    let scripts = script_map(&[
        ("dev", "tsx watch src/index.ts"),
        ("build", "tsc"),
        ("start", "node dist/index.js"),
    ]);
    Descriptor {
        name: name.to_string(),
        kind: DescriptorKind::App(AppKind::Node),
        relative_dir: PathBuf::from("apps").join(name),
        files: vec![
            (
                PathBuf::from("package.json"),
                manifest_ref(
                    name,
                    &scripts,
                    &[],
                    &[
                        ("@repo/typescript-config", "workspace:*"),
                        ("tsx", "^4.11.0"),
                        ("typescript", TYPESCRIPT_VERSION),
                    ],
                    None,
                ),
            ),
            (PathBuf::from("tsconfig.json"), TemplateRef::bare("package/tsconfig.json")),
            (
                PathBuf::from("src/index.ts"),
                TemplateRef::new("node-app/index.ts", TemplateParams::new().with("name", scoped(name))),
            ),
        ],
        scripts,
        post_create: Vec::new(),
    }
}

/// Full flag set so the generator never blocks on its own prompts
/// mid-orchestration.
fn create_next_app_command(name: &str, root: &Path) -> ExternalCommand {
    let app_dir = format!("apps/{name}");
    ExternalCommand::new(
        &pnpm_bin(),
        &[
            "dlx",
            "create-next-app@latest",
            &app_dir,
            "--typescript",
            "--eslint",
            "--tailwind",
            "--app",
            "--no-src-dir",
            "--turbopack",
            "--import-alias",
            "@/*",
            "--use-pnpm",
        ],
        root,
    )
}

/// The fixed `init` topology: shared config packages, db, queue, docker-dev,
/// a worker app, and a generator-owned Next.js web app.
pub fn workspace_descriptor(
    name: &str,
    package_manager: &str,
    root: &Path,
) -> Result<WorkspaceDescriptor> {
    validate_project_name(name)?;

    let root_scripts = script_map(&[
        ("build", "turbo run build"),
        ("dev", "turbo run dev"),
        ("lint", "turbo run lint"),
        ("format", "prettier --write \"**/*.{ts,tsx,js,json,md}\""),
    ]);

    let root_descriptor = Descriptor {
        name: name.to_string(),
        kind: DescriptorKind::WorkspaceRoot,
        relative_dir: PathBuf::new(),
        files: vec![
            (
                PathBuf::from("package.json"),
                TemplateRef::new(
                    "workspace/package.json",
                    TemplateParams::new()
                        .with("name", name)
                        .with("package_manager", package_manager)
                        .with("scripts", map_json(&root_scripts)),
                ),
            ),
            (
                PathBuf::from("pnpm-workspace.yaml"),
                TemplateRef::bare("workspace/pnpm-workspace.yaml"),
            ),
            (PathBuf::from("turbo.json"), TemplateRef::bare("workspace/turbo.json")),
            (PathBuf::from(".gitignore"), TemplateRef::bare("workspace/gitignore")),
            (
                PathBuf::from(".env.example"),
                TemplateRef::new(
                    "workspace/env.example",
                    TemplateParams::new().with("db_name", dev_database_name(name)),
                ),
            ),
        ],
        scripts: root_scripts,
        post_create: Vec::new(),
    };

    let workspace = WorkspaceDescriptor {
        name: name.to_string(),
        root: root_descriptor,
        members: vec![
            typescript_config_package(),
            eslint_config_package(),
            db_package(root),
            queue_package(),
            docker_dev_package(name),
            worker_app(),
            next_app("web", root),
        ],
    };
    workspace.validate()?;
    Ok(workspace)
}

/// One app descriptor for the `app` operation.
pub fn app_descriptor(name: &str, kind: AppKind, root: &Path) -> Result<Descriptor> {
    validate_project_name(name)?;
    Ok(match kind {
        AppKind::Next => next_app(name, root),
        AppKind::Node => node_app(name),
    })
}

/// Ordered command sequence for `init`: install, members' post-create steps
/// in member order, a second install to link generator-created apps, then
/// format and version-control initialization.
pub fn init_commands(workspace: &WorkspaceDescriptor, root: &Path) -> Vec<ExternalCommand> {
    let pnpm = pnpm_bin();
    let mut commands = vec![ExternalCommand::new(&pnpm, &["install"], root)];
    for member in &workspace.members {
        commands.extend(member.post_create.iter().cloned());
    }
    commands.push(ExternalCommand::new(&pnpm, &["install"], root));
    commands.push(ExternalCommand::new(&pnpm, &["exec", "prettier", "--write", "."], root));
    commands.push(ExternalCommand::new("git", &["init"], root));
    commands
}

/// Ordered command sequence for `app`: the descriptor's own post-create
/// steps, then an install to wire the new member into the workspace.
pub fn app_commands(descriptor: &Descriptor, root: &Path) -> Vec<ExternalCommand> {
    let mut commands = descriptor.post_create.clone();
    commands.push(ExternalCommand::new(&pnpm_bin(), &["install"], root));
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_project_name() {
        assert!(validate_project_name("demo-app").is_ok());
        assert!(validate_project_name("a2").is_ok());
        assert!(validate_project_name("").is_err());
        assert!(validate_project_name("Demo").is_err());
        assert!(validate_project_name("2fast").is_err());
        assert!(validate_project_name("has space").is_err());
        assert!(validate_project_name("../evil").is_err());
    }

    #[test]
    fn test_dev_database_name_replaces_hyphens() {
        assert_eq!(dev_database_name("demo-app"), "demo_app_dev");
        assert_eq!(dev_database_name("api"), "api_dev");
    }

    #[test]
    fn test_workspace_topology_members() {
        let root = Path::new("/tmp/demo-app");
        let ws = workspace_descriptor("demo-app", "pnpm@9.0.0", root).unwrap();

        let dirs: Vec<_> = ws
            .members
            .iter()
            .map(|m| m.relative_dir.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            dirs,
            vec![
                "packages/typescript-config",
                "packages/eslint-config",
                "packages/db",
                "packages/queue",
                "packages/docker-dev",
                "apps/worker",
                "apps/web",
            ]
        );
    }

    #[test]
    fn test_init_command_order() {
        let root = Path::new("/tmp/demo-app");
        let ws = workspace_descriptor("demo-app", "pnpm@9.0.0", root).unwrap();
        let commands = init_commands(&ws, root);
        let lines: Vec<_> = commands.iter().map(|c| c.display_line()).collect();

        // install first, generator and prisma in member order, then the
        // linking install, formatter and git last.
        assert!(lines[0].ends_with("install"));
        let prisma = lines.iter().position(|l| l.contains("prisma generate")).unwrap();
        let next = lines.iter().position(|l| l.contains("create-next-app")).unwrap();
        assert!(prisma > 0);
        assert!(next > prisma);
        assert!(lines[lines.len() - 2].contains("prettier"));
        assert_eq!(lines[lines.len() - 1], "git init");
        assert!(commands.iter().all(|c| !c.allow_failure));
    }

    #[test]
    fn test_node_app_descriptor_shape() {
        let root = Path::new("/tmp/demo-app");
        let d = app_descriptor("jobs", AppKind::Node, root).unwrap();
        assert_eq!(d.relative_dir, PathBuf::from("apps/jobs"));
        assert_eq!(d.files.len(), 3);
        assert!(d.post_create.is_empty());
        assert_eq!(d.scripts["dev"], "tsx watch src/index.ts");
    }

    #[test]
    fn test_next_app_descriptor_is_generator_owned() {
        let root = Path::new("/tmp/demo-app");
        let d = app_descriptor("site", AppKind::Next, root).unwrap();
        assert!(d.files.is_empty());
        assert_eq!(d.post_create.len(), 1);
        assert!(d.post_create[0].display_line().contains("create-next-app"));
        assert!(d.post_create[0].display_line().contains("apps/site"));
    }

    #[test]
    fn test_app_commands_end_with_install() {
        let root = Path::new("/tmp/demo-app");
        let d = app_descriptor("jobs", AppKind::Node, root).unwrap();
        let commands = app_commands(&d, root);
        assert_eq!(commands.len(), 1);
        assert!(commands[0].display_line().ends_with("install"));
    }

    #[test]
    fn test_find_workspace_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("demo");
        let nested = root.join("apps/worker/src");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join("pnpm-workspace.yaml"), "packages: []\n").unwrap();

        assert_eq!(find_workspace_root(&nested).unwrap(), root);
        assert!(matches!(
            find_workspace_root(tmp.path()),
            Err(ScaffoldError::WorkspaceNotFound)
        ));
    }
}
