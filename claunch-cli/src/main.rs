use std::io::IsTerminal;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use claunch_core::{
    ClaunchError, ClaunchPaths, ClaunchUrl, Config, ConfigStore, FsDiscovery, Launcher,
    OsascriptPicker, ProjectResolver, ProtocolMode, SystemLauncher, resolve_request,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "claunch",
    version,
    about = "Open Claude Code in a terminal from claunch:// links",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
struct Cli {
    /// Link like claunch://open?v=1&prompt=<text>&project=<name>
    #[arg(required = true)]
    url: Option<String>,

    /// Accept links without `v`, including literal `directory=<path>`
    #[arg(long)]
    legacy: bool,

    /// Print the resolved request as JSON instead of opening a terminal
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a default config file with an auto-detected terminal
    Init,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("claunch: {}", user_facing_error(&err));
            ExitCode::from(1)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("CLAUNCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}

fn run(cli: Cli) -> claunch_core::Result<()> {
    let paths = ClaunchPaths::from_env_or_home()?;

    if let Some(Command::Init) = cli.command {
        return run_init(&paths);
    }

    let Some(url) = cli.url else {
        return Err(ClaunchError::MalformedRequest("missing url".to_string()));
    };
    let mode = if cli.legacy {
        ProtocolMode::Legacy
    } else {
        ProtocolMode::Versioned
    };

    let store = ConfigStore::new(&paths.config_path);
    let config = store.load();
    let request = ClaunchUrl::parse(&url, mode)?;

    let discovery = FsDiscovery::new(&paths.projects_root);
    let picker = OsascriptPicker::from_env();
    let resolver = ProjectResolver::new(&discovery, &picker, &store);
    let resolved = resolve_request(&request, config.as_ref(), &resolver)?;

    if cli.dry_run {
        let json = serde_json::to_string_pretty(&resolved)
            .map_err(|err| ClaunchError::Serialization(err.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    let terminal = resolved
        .updated_config
        .as_ref()
        .or(config.as_ref())
        .and_then(|config| config.terminal);
    SystemLauncher::from_env().launch(terminal, &resolved)
}

fn run_init(paths: &ClaunchPaths) -> claunch_core::Result<()> {
    let terminal = SystemLauncher::from_env().detect_terminal();
    let config = Config {
        terminal: Some(terminal),
        ..Config::default()
    };
    ConfigStore::new(&paths.config_path).create_new(&config)?;

    println!("Created {}", paths.config_path.display());
    println!("  terminal: {terminal}");
    Ok(())
}

fn user_facing_error(err: &ClaunchError) -> String {
    match err {
        ClaunchError::UnresolvedProject { .. } => format!(
            "{err}\nhint: open the project in Claude Code once, or add it under \"projects\" in your claunch config."
        ),
        ClaunchError::TerminalUnavailable(_) => format!(
            "{err}\nhint: install the terminal or change \"terminal\" in your claunch config (ghostty, iterm, terminal)."
        ),
        ClaunchError::ConfigExists { .. } => {
            format!("{err}\nhint: edit the existing file or remove it before running `claunch init`.")
        }
        _ => err.to_string(),
    }
}
