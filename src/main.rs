use std::sync::Arc;

use clap::{Parser, Subcommand};
use skywatch::{
    config::AppConfig,
    http_client::create_retryable_http_client,
    notifier::webhook::WebhookSink,
    persistence::{sqlite::SqliteAreaStore, traits::AreaStore},
    source::opensky::OpenSkySource,
    supervisor::Supervisor,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the monitoring supervisor.
    Run {
        /// Directory holding app.yaml; defaults to ./configs.
        #[arg(long)]
        config_dir: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config_dir } => run_supervisor(config_dir.as_deref()).await?,
    }

    Ok(())
}

async fn run_supervisor(config_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!("Loading application configuration...");
    let config = AppConfig::new(config_dir)?;
    tracing::debug!(
        database_url = %config.database_url,
        source_url = %config.source_url,
        "Configuration loaded."
    );

    tracing::debug!("Initializing area store...");
    let store = Arc::new(SqliteAreaStore::new(&config.database_url).await?);
    store.run_migrations().await?;
    tracing::info!("Database migrations completed.");

    let base_client = reqwest::Client::builder().timeout(config.request_timeout).build()?;
    let http_client = create_retryable_http_client(&config.http_retry, base_client);

    let source = OpenSkySource::new(config.source_url.clone(), http_client.clone());
    let sink = WebhookSink::new(config.webhook_url.clone(), http_client);

    let supervisor = Supervisor::builder()
        .config(config)
        .store(store as Arc<dyn AreaStore>)
        .source(Arc::new(source))
        .sink(Arc::new(sink))
        .build()
        .await?;

    tracing::info!("Supervisor initialized, starting monitoring...");

    supervisor.run().await?;

    Ok(())
}
