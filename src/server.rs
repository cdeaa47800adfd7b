//! Listener and dispatch loop.
//!
//! `Server::bind` bootstraps the schema, binds the socket with address reuse,
//! and hands back a server ready to accept. Each accepted socket gets its
//! own task running a [`ConnectionHandler`](crate::connection::ConnectionHandler).
//!
//! Admission is unbounded unless `max_connections` is set, in which case a
//! semaphore permit is taken before each `accept()` and held by the session.
//! Shutdown stops accepting; sessions already running are not waited on.

use crate::connection::{handle_connection, ConnectionConfig, ConnectionStats};
use crate::executor::StatementExecutor;
use crate::protocol::DEFAULT_MAX_FRAME_SIZE;
use crate::storage::{Store, StoreError, DEFAULT_BUSY_TIMEOUT};
use crate::{DEFAULT_DB_FILE, DEFAULT_HOST, DEFAULT_PORT, SERVER_NAME};
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{lookup_host, TcpListener, TcpSocket};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Pending-connection queue length passed to `listen()`.
const LISTEN_BACKLOG: u32 = 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Database file shared by every session
    pub db_path: PathBuf,
    /// Largest request accepted, in bytes
    pub max_frame_size: usize,
    /// Close sessions that send nothing for this long
    pub idle_timeout: Option<Duration>,
    /// Cap on concurrent sessions; `None` is unbounded, `Some(0)` is rejected
    pub max_connections: Option<usize>,
    /// How long a statement waits on a locked database
    pub busy_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            idle_timeout: None,
            max_connections: None,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            max_frame_size: self.max_frame_size,
            idle_timeout: self.idle_timeout,
        }
    }
}

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// What happened during startup that did not prevent the server from running.
#[derive(Debug)]
pub struct StartupReport {
    /// Outcome of creating the bootstrap tables
    pub schema: Result<(), StoreError>,
}

impl StartupReport {
    pub fn is_degraded(&self) -> bool {
        self.schema.is_err()
    }
}

/// A bound server, ready to accept clients.
pub struct Server {
    listener: TcpListener,
    executor: StatementExecutor,
    stats: Arc<ConnectionStats>,
    connection_config: ConnectionConfig,
    limiter: Option<Arc<Semaphore>>,
}

impl Server {
    /// Initializes the schema, then binds the listening socket.
    ///
    /// A schema failure is reported in the returned [`StartupReport`] and
    /// does not stop the bind. A bind failure or an unusable configuration
    /// is returned as an error.
    pub async fn bind(config: ServerConfig) -> Result<(Self, StartupReport), ServerError> {
        if config.max_connections == Some(0) {
            return Err(ServerError::InvalidConfig(
                "max_connections must be at least 1".to_string(),
            ));
        }

        let store =
            Arc::new(Store::new(&config.db_path).with_busy_timeout(config.busy_timeout));
        let report = StartupReport {
            schema: init_schema(Arc::clone(&store)).await,
        };
        match &report.schema {
            Ok(()) => info!(server = SERVER_NAME, "Database initialized successfully"),
            Err(e) => error!(server = SERVER_NAME, error = %e, "Error initializing database"),
        }

        let listener = bind_listener(&config.bind_address()).await?;

        let server = Self {
            listener,
            executor: StatementExecutor::new(store),
            stats: Arc::new(ConnectionStats::new()),
            connection_config: config.connection_config(),
            limiter: config
                .max_connections
                .map(|limit| Arc::new(Semaphore::new(limit))),
        };
        Ok((server, report))
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared statistics for every session this server spawns.
    pub fn stats(&self) -> Arc<ConnectionStats> {
        Arc::clone(&self.stats)
    }

    /// Accepts clients until `shutdown` resolves.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) {
        tokio::select! {
            _ = self.accept_loop() => {}
            _ = shutdown => {}
        }
        info!(server = SERVER_NAME, "Stopped accepting connections");
    }

    /// Accepts clients forever.
    pub async fn run(self) {
        self.accept_loop().await
    }

    /// Main loop that accepts incoming connections
    async fn accept_loop(&self) {
        info!(server = SERVER_NAME, "Waiting for connections...");
        loop {
            let permit = match &self.limiter {
                Some(limiter) => match Arc::clone(limiter).acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return,
                },
                None => None,
            };

            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let executor = self.executor.clone();
                    let stats = Arc::clone(&self.stats);
                    let config = self.connection_config.clone();

                    // Spawn a task to handle this connection
                    tokio::spawn(async move {
                        handle_connection(stream, addr, executor, stats, config).await;
                        drop(permit);
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}

async fn init_schema(store: Arc<Store>) -> Result<(), StoreError> {
    tokio::task::spawn_blocking(move || store.init_schema())
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))?
}

async fn bind_listener(addr: &str) -> Result<TcpListener, ServerError> {
    let bind_err = |source: std::io::Error| ServerError::Bind {
        addr: addr.to_string(),
        source,
    };

    let resolved = lookup_host(addr)
        .await
        .map_err(bind_err)?
        .next()
        .ok_or_else(|| {
            bind_err(std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "address resolved to nothing",
            ))
        })?;

    let socket = if resolved.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(bind_err)?;
    socket.set_reuseaddr(true).map_err(bind_err)?;
    socket.bind(resolved).map_err(bind_err)?;
    let listener = socket.listen(LISTEN_BACKLOG).map_err(bind_err)?;

    match listener.local_addr() {
        Ok(local) => info!(server = SERVER_NAME, addr = %local, "Server started"),
        Err(e) => warn!(error = %e, "Bound listener has no local address"),
    }
    Ok(listener)
}
