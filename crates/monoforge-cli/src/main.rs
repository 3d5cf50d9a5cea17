//! Monoforge CLI - scaffold pnpm/Turborepo monorepos

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use monoforge_core::AppKind;

#[derive(Parser, Debug)]
#[command(name = "monoforge")]
#[command(about = "Scaffold pnpm/Turborepo monorepos with db, queue and docker wiring")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new monorepo workspace
    Init(InitArgs),
    /// Add an app to an existing workspace
    App(AppArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Workspace name (also the directory created)
    name: String,
}

#[derive(Args, Debug)]
struct AppArgs {
    /// App name (the package becomes @repo/<name>)
    name: String,

    /// Generate a Next.js app
    #[arg(long, conflicts_with = "node")]
    next: bool,

    /// Generate a Node.js app
    #[arg(long, conflicts_with = "next")]
    node: bool,
}

impl AppArgs {
    /// When neither flag is given the TUI prompts for the kind.
    fn kind(&self) -> Option<AppKind> {
        if self.next {
            Some(AppKind::Next)
        } else if self.node {
            Some(AppKind::Node)
        } else {
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Init(args) => monoforge_core::tui::run_init(&args.name).await,
        Command::App(args) => monoforge_core::tui::run_app(&args.name, args.kind()).await,
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
