//! Multi-room Chat Server - Entry Point
//!
//! Reads the optional port argument, opens the log file and runs the
//! accept loop.

use std::env;

use tracing::info;

use multiroom_chat::logging::{init_file_logging, DEFAULT_LOG_DIRECTIVE};
use multiroom_chat::{ChatServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_args(env::args().skip(1))?;

    // RUST_LOG overrides the default level, e.g. RUST_LOG=multiroom_chat=debug
    init_file_logging(&config.log_file, DEFAULT_LOG_DIRECTIVE)?;

    let server = ChatServer::bind(&config).await?;
    let addr = server.local_addr()?;
    info!("Chat server listening on {}", addr);
    println!("listening on {}", addr);

    server.run().await;
    Ok(())
}
