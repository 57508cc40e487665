use anyhow::Result;
use clap::Parser;
use cvrchat::cli::Cli;
use cvrchat::Config;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Install default crypto provider for Rustls TLS before any client is built.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let config = Config::load_or_init()?;
    cvrchat::app::dispatch(cli, config).await
}
