use clap::{Args, Subcommand};

mod prune;

#[derive(Debug, Args)]
pub(crate) struct CartsCommand {
    #[command(subcommand)]
    command: CartsSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartsSubcommand {
    /// Delete expired, submitted and unreadable cart records
    Prune(prune::PruneArgs),
}

pub(crate) async fn run(command: CartsCommand) -> Result<(), String> {
    match command.command {
        CartsSubcommand::Prune(args) => prune::run(args).await,
    }
}
