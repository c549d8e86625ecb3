pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "storefront-api")]
#[command(about = "E-commerce catalog API server and maintenance tasks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Create the database tables and exit")]
    Migrate,

    #[command(about = "Create an account with the admin role")]
    CreateAdmin(commands::admin::CreateAdminArgs),
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::handle(args).await,
        Some(Commands::Migrate) => commands::migrate::handle().await,
        Some(Commands::CreateAdmin(args)) => commands::admin::handle(args).await,
        None => commands::serve::handle(commands::serve::ServeArgs::default()).await,
    }
}
