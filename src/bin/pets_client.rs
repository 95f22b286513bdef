use std::process::ExitCode;

use clap::Parser;
use pets_api::client::{fetch_and_render, parse_bool, PetsClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Get pets from the server and print them to stdout as JSON
#[derive(Debug, Parser)]
#[command(name = "pets-client", version)]
struct Cli {
    /// Only pets with (true) or without (false) photos
    #[arg(value_parser = parse_bool)]
    has_photos: Option<bool>,

    /// Base URL of the pets server, e.g. http://127.0.0.1:8000
    #[arg(long, env = "SERVER_ADDRESS")]
    server_address: String,

    /// Header the API key is sent in
    #[arg(long, env = "API_KEY_HEADER", default_value = "X-API-KEY")]
    api_key_header: String,

    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env before parsing so clap can fall back to it
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let client = match PetsClient::new(&cli.server_address, &cli.api_key_header, &cli.api_key) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match fetch_and_render(&client, cli.has_photos).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
