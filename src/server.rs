use std::str;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::EnvFilter;

use crate::commands;
use crate::config::Config;
use crate::connection::Connection;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

pub async fn run(config: Config) -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let store = Store::new(config.eviction, config.capacity)?;
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;

    info!(
        policy = %store.policy(),
        capacity = ?store.capacity(),
        "Cache server listening on {}",
        listener.local_addr()?
    );

    serve(listener, store).await
}

/// Accepts clients on `listener` until accepting fails, serving each one on its own task
/// against the shared `store`.
pub async fn serve(listener: TcpListener, store: Store) -> Result<(), Error> {
    loop {
        let (socket, client_address) = listener.accept().await?;
        let store = store.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, store).await {
                error!(error = %e, "Connection handler failed");
            }
        });
    }
}

#[instrument(name = "connection", skip(stream, store), fields(connection_id, client_address))]
async fn handle_connection(stream: TcpStream, store: Store) -> Result<(), Error> {
    let mut conn = Connection::new(stream);

    let span = tracing::Span::current();
    span.record("connection_id", conn.id.to_string());
    if let Some(client_address) = conn.client_address {
        span.record("client_address", client_address.to_string());
    }

    loop {
        let message = match conn.read_message().await {
            Ok(Some(message)) => message,
            Ok(None) => break,
            Err(e) => {
                // The stream can not be resynchronised after a bad header.
                warn!("Closing connection on framing error: {}", e);
                return Ok(());
            }
        };

        let response = match str::from_utf8(&message) {
            Ok(line) => {
                debug!("Received request: {:?}", line);
                commands::execute(line.trim(), &store)
            }
            Err(e) => Frame::Error(format!("Invalid UTF-8 in request: {}", e)),
        };

        debug!("Sending response: {}", response);
        conn.write_frame(&response).await?;
    }

    info!("Connection closed");
    Ok(())
}
