use clap::Parser;
use deploy_scripts::{cli::Cli, config::Configuration};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Cli { config, command } = Cli::parse();

    let result = match Configuration::try_from(config) {
        Ok(config) => command.run(&config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}
