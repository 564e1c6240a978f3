#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]

mod commands;
mod logging;
mod ua;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use strata_core::roots::RootOptions;
use strata_core::Config;

#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about = "Device-variant builds for split source trees", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Build every device variant and merge the outputs
    Build {
        /// Entry document (defaults to index.html or the config file value)
        #[arg(long)]
        entry: Option<String>,

        /// Output directory
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        #[command(flatten)]
        roots: RootArgs,
    },

    /// Serve the project with per-request device routing
    Dev {
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "localhost")]
        host: String,

        #[command(flatten)]
        roots: RootArgs,
    },
}

/// Device-root overrides shared by build and dev.
#[derive(clap::Args, Debug, Clone)]
struct RootArgs {
    /// Directory containing desktop-only modules
    #[arg(long, value_name = "PATH")]
    desktop_root: Option<String>,

    /// Directory containing phone-only modules
    #[arg(long, value_name = "PATH")]
    mobile_root: Option<String>,

    /// Directory containing tablet-only modules (defaults to the mobile root)
    #[arg(long, value_name = "PATH")]
    tablet_root: Option<String>,
}

impl From<RootArgs> for RootOptions {
    fn from(args: RootArgs) -> Self {
        Self {
            desktop_root: args.desktop_root,
            mobile_root: args.mobile_root,
            tablet_root: args.tablet_root,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = match cli.cwd.clone() {
        Some(path) => path,
        None => std::env::current_dir().into_diagnostic()?,
    };
    let config = Config::new(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Commands::Version => commands::version::run(cli.json),
        Commands::Build {
            entry,
            out_dir,
            roots,
        } => {
            let action = commands::build::BuildAction {
                cwd: config.cwd,
                entry,
                out_dir,
                roots: roots.into(),
            };
            commands::build::run(action, cli.json)
        }
        Commands::Dev { port, host, roots } => {
            let action = commands::dev::DevAction {
                cwd: config.cwd,
                port,
                host,
                roots: roots.into(),
            };
            let rt = tokio::runtime::Runtime::new().into_diagnostic()?;
            rt.block_on(commands::dev::run(action))
        }
    }
}
