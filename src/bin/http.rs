#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::net::SocketAddr;
    use std::path::PathBuf;

    use clap::Parser;
    use maintenance_tracker::{
        Clock, StorageBackend, SystemClock, Tracker, TrackerConfig, http_api,
    };
    use tracing_subscriber::EnvFilter;

    /// HTTP front-end for the maintenance tracker.
    #[derive(Parser)]
    #[command(name = "maintenance-tracker-http", version, about)]
    struct Args {
        /// Address to listen on.
        #[arg(long, env = "MAINTENANCE_TRACKER_HTTP_ADDR", default_value = "0.0.0.0:3000")]
        addr: SocketAddr,

        /// Data file holding the maintenance records.
        #[arg(long, env = "MAINTENANCE_TRACKER_DATA", default_value = "data/items.csv")]
        data_file: PathBuf,

        /// Storage backend for the data file.
        #[arg(long, default_value_t = StorageBackend::Lines)]
        backend: StorageBackend,
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("maintenance_tracker=info")),
        )
        .init();

    let args = Args::parse();
    let config = TrackerConfig {
        data_file: args.data_file,
        backend: args.backend,
    };
    let store = config.open_store()?;
    let clock: Box<dyn Clock + Send + Sync> = Box::new(SystemClock);
    let (tracker, _skipped) = Tracker::open(store, clock)?;

    let addr = args.addr;
    tracing::info!(%addr, data_file = %config.data_file.display(), "maintenance tracker HTTP API listening");
    http_api::serve(addr, tracker).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
