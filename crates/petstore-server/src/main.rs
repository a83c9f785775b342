use clap::Parser;
use petstore_server::{SeedSource, ServerConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "petstore-server", about = "Pet catalog HTTP server")]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// JSON file with the initial pets (an array, every pet with an id).
    #[arg(long, conflicts_with = "empty")]
    seed: Option<PathBuf>,

    /// Start with an empty catalog instead of the built-in pets.
    #[arg(long)]
    empty: bool,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let seed = match (self.seed, self.empty) {
            (Some(path), _) => SeedSource::File(path),
            (None, true) => SeedSource::Empty,
            (None, false) => SeedSource::Builtin,
        };
        ServerConfig {
            host: self.host,
            port: self.port,
            seed,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();

    let service = match config.build_service() {
        Ok(service) => service,
        Err(e) => {
            error!("failed to load catalog: {e}");
            return ExitCode::FAILURE;
        }
    };

    let addr = config.addr();
    info!("starting petstore-server on {addr}");
    info!("catalog seeded with {} pets", service.find_all().len());

    match petstore_server::run_server(&service, &addr) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error on {addr}: {e}");
            ExitCode::FAILURE
        }
    }
}
