use clap::Parser;
use tracing_subscriber::EnvFilter;

use a3s_push::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            backend,
        } => {
            a3s_push::cli::serve::execute(cli.config.as_deref(), host, port, backend).await?;
        }
        Commands::Push {
            url,
            name,
            payload,
            user_id,
        } => {
            a3s_push::cli::push::execute(&url, &name, &payload, user_id).await?;
        }
    }

    Ok(())
}
