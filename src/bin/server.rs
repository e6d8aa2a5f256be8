//! Drawing relay server entry point.
//!
//! Accepts WebSocket connections, groups them into rooms by short code, and
//! fans out stroke-segment, canvas-clear, and chat events to the other
//! members of the same room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin rakugaki-server
//! cargo run --bin rakugaki-server -- --host 0.0.0.0 --port 3000
//! ```

use clap::Parser;
use rakugaki::common::logger::setup_logger;
use rakugaki::server::run_server;

#[derive(Parser, Debug)]
#[command(name = "rakugaki-server")]
#[command(about = "Room-scoped relay for collaborative drawing and chat", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run_server(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
