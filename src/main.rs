use clap::Parser;
use dotenv::dotenv;
use reservation_services::app;
use reservation_services::config::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Service(config) => app::run_service(config).await,
        Command::Client(config) => app::run_client(config).await,
    }
}
