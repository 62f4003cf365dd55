use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Terminal aptitude quiz", long_about = None)]
struct Args {
    /// Base URL of the question API
    #[arg(long, default_value = "http://localhost:5000")]
    api_url: String,

    /// Directory for stored results, reports and logs
    #[arg(long, default_value = "aptify-data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.data_dir);

    if let Err(e) = aptify::run(args.api_url, args.data_dir).await {
        eprintln!("Error running quiz: {}", e);
        std::process::exit(1);
    }
}

/// Log to a file under the data directory; the terminal belongs to the TUI.
fn init_logging(data_dir: &Path) {
    let _ = std::fs::create_dir_all(data_dir);
    let Ok(file) = File::create(data_dir.join("aptify.log")) else {
        return;
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aptify=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
}
