use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use coursework_lifecycle::app::App;
use coursework_lifecycle::config::{LifecycleConfig, ServerConfig, DEFAULT_RECONCILE_INTERVAL_MS};
use coursework_lifecycle::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "coursework-lifecycle")]
#[command(version)]
#[command(about = "Assignment lifecycle manager with periodic status reconciliation")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server and the reconciliation loop
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Milliseconds between reconciliation passes
    #[arg(long, default_value_t = DEFAULT_RECONCILE_INTERVAL_MS)]
    interval_ms: u64,
}

async fn run_server(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::new(SocketAddr::new(args.host, args.port))
        .with_lifecycle(LifecycleConfig::default().with_interval_ms(args.interval_ms));

    tracing::info!(
        addr = %config.listen_addr,
        interval_ms = config.lifecycle.interval_ms,
        "Starting coursework-lifecycle"
    );

    let shutdown = install_shutdown_handler()?;
    App::new(config).run(shutdown).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Commands::Serve(serve_args) => {
            run_server(serve_args).await?;
        }
    }

    Ok(())
}
