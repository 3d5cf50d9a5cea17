//! Tool probes and the best-effort pnpm version stamp

use colored::Colorize;
use semver::Version;
use std::process::Command;

/// Stamped into the workspace manifest when the pnpm probe fails. Fixed so
/// offline runs stay reproducible.
pub const FALLBACK_PNPM_VERSION: &str = "9.0.0";

/// Binary used for every pnpm invocation; override with `MONOFORGE_PNPM`.
pub fn pnpm_bin() -> String {
    std::env::var("MONOFORGE_PNPM").unwrap_or_else(|_| "pnpm".to_string())
}

/// Availability probe result for one external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

fn probe(display: &'static str, bin: &str) -> ToolInfo {
    let output = Command::new(bin).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout);
            let version = stdout.lines().next().unwrap_or("").trim().to_string();
            ToolInfo {
                name: display,
                version: Some(version),
                available: true,
            }
        }
        _ => ToolInfo {
            name: display,
            version: None,
            available: false,
        },
    }
}

pub fn check_node() -> ToolInfo {
    probe("Node.js", "node")
}

pub fn check_pnpm() -> ToolInfo {
    probe("pnpm", &pnpm_bin())
}

pub fn check_git() -> ToolInfo {
    probe("git", "git")
}

pub fn check_docker() -> ToolInfo {
    probe("Docker", "docker")
}

/// Advisory report of everything the generated workspace will want.
/// Availability is reported, never enforced - the orchestrated commands
/// surface their own failures.
pub fn check_tools() -> Vec<ToolInfo> {
    vec![check_node(), check_pnpm(), check_git(), check_docker()]
}

/// Normalize a probe's stdout into a bare semver string, if possible.
fn normalize_version(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let cleaned = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(cleaned).ok().map(|v| v.to_string())
}

/// The `packageManager` field value for generated workspace manifests.
///
/// Best-effort by contract: a missing pnpm binary or unparseable version
/// yields the fixed fallback plus a warning, never a failed run.
pub fn package_manager_field() -> String {
    let probed = check_pnpm()
        .version
        .as_deref()
        .and_then(normalize_version);

    match probed {
        Some(version) => format!("pnpm@{version}"),
        None => {
            eprintln!(
                "{} could not detect pnpm; stamping pnpm@{} in the workspace manifest",
                "Warning:".yellow(),
                FALLBACK_PNPM_VERSION
            );
            format!("pnpm@{FALLBACK_PNPM_VERSION}")
        }
    }
}
