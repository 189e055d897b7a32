use crate::commands::{run_create, run_repair, CreateArgs, RepairArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use placement_team::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Placement Team Job Fairs",
    about = "Record job fairs and issue a QR code for each one",
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
    /// Record a job fair and issue its QR code from the command line
    Create(CreateArgs),
    /// Reissue QR codes for job fairs left without one
    Repair(RepairArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Create(args) => run_create(args),
        Command::Repair(args) => run_repair(args),
    }
}
