//! spigen: generate SPIBAR and SPI register offset headers from hardware
//! descriptor trees.

mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use spigen_descriptor::DescriptorError;
use spigen_resolve::ResolveError;
use tracing_subscriber::EnvFilter;

use commands::describe::Format;
use commands::Inputs;
use config::SpigenConfig;

#[derive(Parser)]
#[command(name = "spigen", version, about = "SPI flash controller offset header generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML table of hardware constant overrides
    #[arg(long, global = true)]
    constants: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a header for one platform
    Single {
        /// SKU code (e.g. Q170 or PCH_Q170)
        #[arg(long)]
        pch: String,
        /// Descriptor tree root (default: chipsec/chipsec/cfg)
        #[arg(long)]
        cfg_root: Option<PathBuf>,
        /// Output header path
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Generate a header with a table of several platforms
    Multi {
        /// Comma-separated SKU codes (e.g. Q170,AVN or PCH_Q170,AVN)
        #[arg(long)]
        pchs: String,
        /// Descriptor tree root (default: chipsec/chipsec/cfg)
        #[arg(long)]
        cfg_root: Option<PathBuf>,
        /// Output header path
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Show what a SKU resolves to without writing a header
    Describe {
        /// SKU code (e.g. Q170 or PCH_Q170)
        #[arg(long)]
        pch: String,
        /// Descriptor tree root (default: chipsec/chipsec/cfg)
        #[arg(long)]
        cfg_root: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(exit_code(&e));
    }
}

/// Logs go to stderr. `-v` wins over `RUST_LOG`; with neither, only
/// warnings are shown.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// 2 when the requested platform(s) could not be found, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> i32 {
    let not_found = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<ResolveError>(),
            Some(ResolveError::NoPlatformsResolved { .. })
                | Some(ResolveError::Descriptor(DescriptorError::NotFound { .. }))
        ) || matches!(
            cause.downcast_ref::<DescriptorError>(),
            Some(DescriptorError::NotFound { .. })
        )
    });
    if not_found {
        2
    } else {
        1
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = match SpigenConfig::find_and_load(&cwd)? {
        Some((config, dir)) => {
            tracing::debug!(dir = %dir.display(), "using {}", config::CONFIG_FILE);
            config
        }
        None => SpigenConfig::default(),
    };
    let constants = cli.constants.as_deref();

    match cli.command {
        Commands::Single { pch, cfg_root, out } => {
            let inputs = Inputs::load(&config, cfg_root.as_deref(), constants)?;
            commands::single::run(&inputs, &pch, &out)
        }
        Commands::Multi { pchs, cfg_root, out } => {
            let inputs = Inputs::load(&config, cfg_root.as_deref(), constants)?;
            commands::multi::run(&inputs, &pchs, &out)
        }
        Commands::Describe {
            pch,
            cfg_root,
            format,
        } => {
            let inputs = Inputs::load(&config, cfg_root.as_deref(), constants)?;
            commands::describe::run(&inputs, &pch, format)
        }
    }
}
