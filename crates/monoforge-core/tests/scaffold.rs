//! End-to-end materialization scenarios against a scratch directory.
//!
//! Orchestration is exercised separately (it shells out to real tools);
//! these tests cover everything up to the point external commands take over.

use monoforge_core::{materialize, topology, AppKind, ScaffoldError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn file_count(root: &Path) -> usize {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count()
}

fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

async fn init_demo_workspace(parent: &Path) -> PathBuf {
    let root = parent.join("demo-app");
    let workspace = topology::workspace_descriptor("demo-app", "pnpm@9.0.0", &root).unwrap();
    materialize::materialize_workspace(&root, &workspace)
        .await
        .unwrap();
    root
}

#[tokio::test]
async fn init_materializes_the_full_workspace_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("demo-app");
    let workspace = topology::workspace_descriptor("demo-app", "pnpm@9.0.0", &root).unwrap();
    let result = materialize::materialize_workspace(&root, &workspace)
        .await
        .unwrap();

    for expected in [
        "pnpm-workspace.yaml",
        "package.json",
        "turbo.json",
        ".gitignore",
        ".env.example",
        "packages/typescript-config/base.json",
        "packages/typescript-config/node.json",
        "packages/eslint-config/index.js",
        "packages/db/package.json",
        "packages/db/prisma/schema.prisma",
        "packages/db/src/index.ts",
        "packages/queue/src/index.ts",
        "packages/docker-dev/compose.yml",
        "apps/worker/package.json",
        "apps/worker/src/index.ts",
    ] {
        assert!(root.join(expected).is_file(), "missing {expected}");
    }

    // The web app belongs to create-next-app; materialization must not
    // create it.
    assert!(!root.join("apps/web").exists());

    // Every written path is accounted for, nothing else appeared.
    assert_eq!(result.written.len(), file_count(&root));

    let manifest = read_json(&root.join("package.json"));
    assert_eq!(manifest["name"], "demo-app");
    assert_eq!(manifest["packageManager"], "pnpm@9.0.0");
    assert_eq!(manifest["scripts"]["dev"], "turbo run dev");

    let compose = std::fs::read_to_string(root.join("packages/docker-dev/compose.yml")).unwrap();
    assert!(compose.contains("POSTGRES_DB: demo_app_dev"));
    assert!(compose.contains("\"6379:6379\""));
}

#[tokio::test]
async fn init_refuses_an_existing_project_root() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("demo-app");
    std::fs::create_dir_all(&root).unwrap();

    let workspace = topology::workspace_descriptor("demo-app", "pnpm@9.0.0", &root).unwrap();
    let err = materialize::materialize_workspace(&root, &workspace)
        .await
        .unwrap_err();
    assert!(matches!(err, ScaffoldError::DestinationExists(_)));
}

#[tokio::test]
async fn adding_a_node_app_touches_nothing_else() {
    let tmp = tempfile::tempdir().unwrap();
    let root = init_demo_workspace(tmp.path()).await;

    let worker_manifest_before =
        std::fs::read_to_string(root.join("apps/worker/package.json")).unwrap();
    let count_before = file_count(&root);

    let descriptor = topology::app_descriptor("jobs", AppKind::Node, &root).unwrap();
    let result = materialize::materialize(&root, &descriptor).await.unwrap();

    assert_eq!(
        result.written,
        vec![
            PathBuf::from("apps/jobs/package.json"),
            PathBuf::from("apps/jobs/tsconfig.json"),
            PathBuf::from("apps/jobs/src/index.ts"),
        ]
    );

    let manifest = read_json(&root.join("apps/jobs/package.json"));
    assert_eq!(manifest["name"], "@repo/jobs");

    let stub = std::fs::read_to_string(root.join("apps/jobs/src/index.ts")).unwrap();
    assert!(stub.contains("@repo/jobs"));

    // Pre-existing apps are untouched.
    assert_eq!(
        std::fs::read_to_string(root.join("apps/worker/package.json")).unwrap(),
        worker_manifest_before
    );
    assert_eq!(file_count(&root), count_before + 3);
}

#[tokio::test]
async fn re_adding_an_app_fails_instead_of_regenerating() {
    let tmp = tempfile::tempdir().unwrap();
    let root = init_demo_workspace(tmp.path()).await;

    let descriptor = topology::app_descriptor("jobs", AppKind::Node, &root).unwrap();
    materialize::materialize(&root, &descriptor).await.unwrap();

    // Hand-edit a generated file, then try again without deleting the app.
    let stub = root.join("apps/jobs/src/index.ts");
    std::fs::write(&stub, "// edited by hand\n").unwrap();

    let descriptor = topology::app_descriptor("jobs", AppKind::Node, &root).unwrap();
    let err = materialize::materialize(&root, &descriptor)
        .await
        .unwrap_err();
    assert!(matches!(err, ScaffoldError::DestinationExists(_)));
    assert_eq!(
        std::fs::read_to_string(&stub).unwrap(),
        "// edited by hand\n"
    );
}

#[tokio::test]
async fn materializing_the_same_workspace_twice_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    let first = init_demo_workspace(&tmp.path().join("a")).await;
    let second = init_demo_workspace(&tmp.path().join("b")).await;

    for entry in WalkDir::new(&first)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let relative = entry.path().strip_prefix(&first).unwrap();
        let a = std::fs::read(entry.path()).unwrap();
        let b = std::fs::read(second.join(relative)).unwrap();
        assert_eq!(a, b, "{} differs between runs", relative.display());
    }
}
