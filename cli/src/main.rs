use clap::Parser;
use endoserenite_core::{application::{AppState, create_service}, domain::common::EndoConfig};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, LogArgs};

mod args;
mod commands;
mod output;

fn init_logging(log: &LogArgs) {
    let filter = EnvFilter::try_new(&log.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if log.log_json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log);

    let config = EndoConfig::from(args.clone());
    let service = create_service(config).await?;
    let mut state = AppState::new(service);

    commands::run(&mut state, args.command, args.json, chrono::Utc::now()).await
}
