use crate::console::{run_members_match, run_reallocate, MembersMatchArgs, ReallocateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use union_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "union-portal",
    about = "Run the redevelopment union portal or its calculators from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Co-owner share calculations
    Ownership {
        #[command(subcommand)]
        command: OwnershipCommand,
    },
    /// Member spreadsheet tools
    Members {
        #[command(subcommand)]
        command: MembersCommand,
    },
}

#[derive(Subcommand, Debug)]
enum OwnershipCommand {
    /// Recompute ratios after adding a new co-owner
    Reallocate(ReallocateArgs),
}

#[derive(Subcommand, Debug)]
enum MembersCommand {
    /// Match a member spreadsheet against a parcel table
    Match(MembersMatchArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Parcel table CSV to preload
    #[arg(long)]
    pub(crate) parcels: Option<PathBuf>,
    /// Union that owns the preloaded parcel table
    #[arg(long, default_value = "default")]
    pub(crate) union: String,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            parcels: None,
            union: "default".to_string(),
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Ownership {
            command: OwnershipCommand::Reallocate(args),
        } => run_reallocate(args),
        Command::Members {
            command: MembersCommand::Match(args),
        } => run_members_match(args),
    }
}
