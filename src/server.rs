//! TCP acceptor for quiz sessions.
//!
//! Binds the listen address and spawns one isolated session task per
//! incoming connection. A session failure never affects other sessions or
//! the listener.

use crate::config::Config;
use crate::session::{self, Conn};
use crate::store::{FileStore, MemoryStore, QuizStore, StoreError};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// Maximum number of concurrent connections
const MAX_CONNECTIONS: usize = 10000;

/// Server instance
pub struct Server {
    config: Config,
    store: Arc<dyn QuizStore>,
    connection_limit: Arc<Semaphore>,
}

impl Server {
    /// Create a new server instance, opening the configured catalog backend
    pub fn new(config: Config) -> Result<Self, StoreError> {
        let store: Arc<dyn QuizStore> = match &config.data_file {
            Some(path) => Arc::new(FileStore::open(path.clone())?),
            None => {
                info!("No data file configured, using in-memory catalog");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Server {
            config,
            store,
            connection_limit: Arc::new(Semaphore::new(MAX_CONNECTIONS)),
        })
    }

    /// Start the server and begin accepting connections
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(&self.config.listen).await?;
        info!(address = %self.config.listen, "Server listening");

        loop {
            // Wait for a connection slot
            let permit = self.connection_limit.clone().acquire_owned().await?;

            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!(peer = %addr, "New connection");

                    let store = Arc::clone(&self.store);
                    let echo_prefill = self.config.echo_prefill;

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, store, echo_prefill).await {
                            debug!(peer = %addr, error = %e, "Connection error");
                        }
                        debug!(peer = %addr, "Session ended");
                        drop(permit);
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Get a reference to the store for testing
    #[cfg(test)]
    pub fn store(&self) -> &Arc<dyn QuizStore> {
        &self.store
    }
}

/// Run one session over a fresh connection
async fn handle_connection(
    stream: TcpStream,
    store: Arc<dyn QuizStore>,
    echo_prefill: bool,
) -> Result<(), session::SessionError> {
    let (read_half, write_half) = stream.into_split();
    let conn = Conn::new(BufReader::new(read_half), write_half, echo_prefill);
    session::run(store, conn).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_creation_defaults_to_memory_store() {
        let config = Config {
            listen: "127.0.0.1:0".to_string(),
            data_file: None,
            echo_prefill: false,
            color: false,
            log_level: "info".to_string(),
        };

        let server = Server::new(config).unwrap();
        assert!(server.store().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_over_tcp() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let config = Config {
            listen: "127.0.0.1:0".to_string(),
            data_file: None,
            echo_prefill: false,
            color: false,
            log_level: "info".to_string(),
        };
        let server = Server::new(config).unwrap();
        server
            .store()
            .create("Capital de España", "Madrid")
            .await
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let store = Arc::clone(server.store());
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let _ = handle_connection(stream, store, false).await;
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"show 1\r\nq\r\n").await.unwrap();
        client.shutdown().await.unwrap();

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        assert!(output.contains("Capital de España"));
        assert!(output.contains("Madrid"));
    }
}
