use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod display;

use commands::{add, commit, help, init, log, status};

#[derive(Parser)]
#[command(name = "minigit")]
#[command(version, about = "A minimal local version control tool", long_about = None)]
#[command(disable_help_subcommand = true, allow_external_subcommands = true)]
struct Cli {
    /// Run as if minigit was started in this directory
    #[arg(short = 'C', global = true, default_value = ".")]
    dir: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new Mini Git repo
    Init(Extra),

    /// Add a file to staging area
    Add {
        /// File to stage
        #[arg(allow_hyphen_values = true)]
        filename: Option<String>,

        #[command(flatten)]
        extra: Extra,
    },

    /// Commit staged changes with a message
    Commit {
        /// Commit message
        #[arg(allow_hyphen_values = true)]
        message: Option<String>,

        #[command(flatten)]
        extra: Extra,
    },

    /// Show commit history
    Log(Extra),

    /// Show status of working directory
    Status(Extra),

    /// Show this help message
    Help(Extra),

    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

// Arguments past the ones a command uses are accepted and ignored.
#[derive(Args)]
struct Extra {
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    ignored: Vec<String>,
}

impl Commands {
    fn extra(&self) -> Option<&Extra> {
        match self {
            Commands::Init(extra)
            | Commands::Log(extra)
            | Commands::Status(extra)
            | Commands::Help(extra)
            | Commands::Add { extra, .. }
            | Commands::Commit { extra, .. } => Some(extra),
            Commands::Unknown(_) => None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    let Some(command) = cli.command else {
        println!("Usage: minigit <command> [arguments]");
        return Ok(());
    };

    if let Some(extra) = command.extra().filter(|extra| !extra.ignored.is_empty()) {
        tracing::debug!("Ignoring extra arguments: {:?}", extra.ignored);
    }

    match command {
        Commands::Init(_) => init::run(&cli.dir)?,
        Commands::Add { filename, .. } => match filename {
            Some(filename) => add::run(&cli.dir, &filename)?,
            None => println!("Usage: minigit add <filename>"),
        },
        Commands::Commit { message, .. } => match message {
            Some(message) => commit::run(&cli.dir, &message)?,
            None => println!("Usage: minigit commit <message>"),
        },
        Commands::Log(_) => log::run(&cli.dir)?,
        Commands::Status(_) => status::run(&cli.dir)?,
        Commands::Help(_) => help::run()?,
        Commands::Unknown(args) => {
            let name = args.first().map(String::as_str).unwrap_or_default();
            println!(
                "Unknown command: {}. Use 'help' to see available commands.",
                name
            );
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout only carries command output.
fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::try_new("minigit=debug,minigit_core=debug,warn")
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if debug {
        tracing::debug!("Debug logging enabled");
    }
}
