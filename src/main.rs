use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hbnb::{Console, FileStorage, StorageConfig, DEFAULT_FILE_PATH, FILE_PATH_ENV, VERSION};

/// Command interpreter for the HBNB entity store
#[derive(Parser)]
#[command(name = "hbnb")]
#[command(version)]
struct Cli {
    /// JSON file holding every entity
    #[arg(short, long, env = FILE_PATH_ENV, default_value = DEFAULT_FILE_PATH)]
    file: PathBuf,

    /// Run these commands instead of reading from stdin
    #[arg(short = 'c', long = "command")]
    commands: Vec<String>,
}

fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StorageConfig::new(cli.file);

    let mut storage = FileStorage::from_config(&config);
    storage
        .reload()
        .with_context(|| format!("failed to load {}", config.file_path.display()))?;
    info!(version = VERSION, entities = storage.len(), "storage ready");

    let stdout = io::stdout();
    let mut console = Console::new(&mut storage, stdout.lock());

    if cli.commands.is_empty() {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        console.run(stdin.lock(), interactive)?;
    } else {
        for command in &cli.commands {
            if console.onecmd(command)? {
                break;
            }
        }
    }

    Ok(())
}
