use clap::Parser;
use storefront_api::cli::{self, Cli};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present so local runs pick up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => tracing::error!("Fatal: {e:?}"),
            _ => tracing::error!("Fatal: {e}"),
        }
        std::process::exit(1);
    }
}
