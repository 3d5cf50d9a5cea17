//! Interactive flows for `init` and `app`

use crate::descriptor::AppKind;
use crate::orchestrate::{self, ExternalCommand};
use crate::runtime::check;
use crate::{materialize, topology};
use anyhow::Result;

/// Run the `init <name>` flow: advisory tool report, materialize the built-in
/// topology, then orchestrate the external steps.
pub async fn run_init(name: &str) -> Result<()> {
    cliclack::intro("monoforge")?;

    report_tools()?;

    let root = std::env::current_dir()?.join(name);
    let package_manager = check::package_manager_field();
    let workspace = topology::workspace_descriptor(name, &package_manager, &root)?;

    let spinner = cliclack::spinner();
    spinner.start("Materializing workspace...");
    match materialize::materialize_workspace(&root, &workspace).await {
        Ok(result) => {
            spinner.stop(format!(
                "Created {} files in {}",
                result.written.len(),
                root.display()
            ));
        }
        Err(e) => {
            spinner.stop("Materialization failed");
            return Err(e.into());
        }
    }

    run_commands(&topology::init_commands(&workspace, &root)).await?;

    print_next_steps(name);
    cliclack::outro("Happy hacking!")?;
    Ok(())
}

/// Run the `app <name>` flow inside an existing workspace. When `kind` is
/// `None` the user picks one interactively (blocking, single selection).
pub async fn run_app(name: &str, kind: Option<AppKind>) -> Result<()> {
    cliclack::intro("monoforge")?;

    let kind = match kind {
        Some(kind) => kind,
        None => prompt_app_kind()?,
    };

    let cwd = std::env::current_dir()?;
    let root = topology::find_workspace_root(&cwd)?;
    cliclack::log::info(format!("Workspace root: {}", root.display()))?;

    let descriptor = topology::app_descriptor(name, kind, &root)?;
    let result = materialize::materialize(&root, &descriptor).await?;
    if result.written.is_empty() {
        cliclack::log::info(format!(
            "{} owns the files for {}; handing over to the generator",
            kind.display_name(),
            descriptor.relative_dir.display()
        ))?;
    } else {
        cliclack::log::success(format!(
            "Created {} files under {}",
            result.written.len(),
            descriptor.relative_dir.display()
        ))?;
    }

    run_commands(&topology::app_commands(&descriptor, &root)).await?;

    cliclack::outro(format!("Added {}/{name}", topology::PACKAGE_SCOPE))?;
    Ok(())
}

fn prompt_app_kind() -> Result<AppKind> {
    let kind = cliclack::select("What kind of app?")
        .item(AppKind::Next, "Next.js", "web app generated with create-next-app")
        .item(AppKind::Node, "Node.js", "worker-style TypeScript service")
        .interact()?;
    Ok(kind)
}

fn report_tools() -> Result<()> {
    let tools = check::check_tools();
    let summary: Vec<String> = tools
        .iter()
        .map(|tool| match (&tool.version, tool.available) {
            (Some(version), true) => format!("{} ({})", tool.name, version),
            _ => format!("{} (not found)", tool.name),
        })
        .collect();
    cliclack::log::info(format!("Detected tools: {}", summary.join(", ")))?;
    Ok(())
}

/// Drive the orchestrator and turn its fail-fast report into a CLI error.
/// Materialized files are deliberately left in place on failure.
async fn run_commands(commands: &[ExternalCommand]) -> Result<()> {
    let result = orchestrate::run(commands).await;

    if let Some(failure) = result.failure {
        let exit = failure
            .exit_code
            .map(|code| format!(" (exit code {code})"))
            .unwrap_or_else(|| " (could not be started)".to_string());
        cliclack::log::error(format!(
            "Step {}/{} failed: `{}`{}",
            failure.index + 1,
            commands.len(),
            failure.command,
            exit
        ))?;
        cliclack::log::info(
            "Generated files were left in place. Fix the cause, then re-run the remaining commands manually.",
        )?;
        anyhow::bail!("command failed: {}", failure.command);
    }

    Ok(())
}

fn print_next_steps(name: &str) {
    let steps = [
        format!("cd {name}"),
        "cp .env.example .env".to_string(),
        "pnpm --filter @repo/docker-dev dev".to_string(),
        "pnpm --filter @repo/db db:push".to_string(),
        "pnpm dev".to_string(),
    ];

    println!();
    println!("  Next steps");
    println!();
    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }
}
