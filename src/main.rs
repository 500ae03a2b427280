//! motel-map CLI entry point
//!
//! Map of the requester's location and nearby lodging - CLI + web app

use motel_map::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
