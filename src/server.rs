use crate::config::{Config, ServerConfig};
use crate::core_protocol::Connection;
use crate::core_session::{Session, SessionSettings};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Runs the file-sharing server until Ctrl-C.
///
/// Sessions still in flight at that point are not drained; they end with
/// the process.
pub async fn run(config: Config) -> Result<()> {
    log_config(&config.server);

    let server = Server::bind(&config.server).await?;
    match server.serve_until(shutdown_signal()).await {
        Ok(()) => info!("Server stopped."),
        Err(e) => {
            error!("Server failed: {}", e);
            return Err(e);
        }
    }

    Ok(())
}

/// A bound listener plus the immutable settings every session receives.
pub struct Server {
    listener: TcpListener,
    settings: Arc<SessionSettings>,
    limiter: Option<Arc<Semaphore>>,
}

impl Server {
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let settings =
            SessionSettings::from_config(config).context("Invalid authentication settings")?;
        prepare_shared_dir(&config.shared_dir).await?;

        let address = config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {}", address))?;
        info!(
            "Server listening on {}, shared_dir={}",
            listener.local_addr()?,
            config.shared_dir.display()
        );

        Ok(Self {
            listener,
            settings: Arc::new(settings),
            limiter: config
                .max_connections
                .map(|limit| Arc::new(Semaphore::new(limit))),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves, then drops the socket.
    pub async fn serve_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down server");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((socket, peer)) => self.spawn_session(socket, peer),
                    Err(e) => {
                        // Typically fd exhaustion; back off instead of spinning
                        error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                },
            }
        }

        Ok(())
    }

    fn spawn_session(&self, socket: TcpStream, peer: SocketAddr) {
        let permit = match self.try_admit() {
            Ok(permit) => permit,
            Err(()) => {
                warn!("Rejecting {}: connection limit reached", peer);
                tokio::spawn(reject_busy(socket, peer));
                return;
            }
        };

        if let Err(e) = socket.set_nodelay(true) {
            debug!("[{}] could not set TCP_NODELAY: {}", peer, e);
        }

        let settings = Arc::clone(&self.settings);
        tokio::spawn(async move {
            let _permit = permit;
            info!("[+] Connection from {}", peer);

            let session = Session::new(socket, peer, settings);
            match session.run().await {
                Ok(()) => {}
                Err(e) if e.is_disconnect() => info!("[{}] peer went away: {}", peer, e),
                Err(e) => warn!("[{}] session ended with error: {}", peer, e),
            }

            info!("[#] Connection closed {}", peer);
        });
    }

    fn try_admit(&self) -> Result<Option<OwnedSemaphorePermit>, ()> {
        match &self.limiter {
            Some(limiter) => Arc::clone(limiter)
                .try_acquire_owned()
                .map(Some)
                .map_err(|_| ()),
            None => Ok(None),
        }
    }
}

async fn reject_busy(socket: TcpStream, peer: SocketAddr) {
    let mut conn = Connection::new(socket).with_timeout(Some(Duration::from_secs(5)));
    if let Err(e) = conn.write_line("ERR Server busy").await {
        debug!("[{}] could not send busy notice: {}", peer, e);
    }
    if let Err(e) = conn.shutdown().await {
        debug!("[{}] shutdown after busy notice failed: {}", peer, e);
    }
}

/// Creates the shared directory and its parents if they do not exist yet.
pub async fn prepare_shared_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create shared directory: {}", dir.display()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for the interrupt signal: {}", e);
        // Without a signal handler the server simply runs until killed
        std::future::pending::<()>().await;
    }
}

// Helper function to log configuration options
pub fn log_config(config: &ServerConfig) {
    info!("  Bind Address: {}", config.bind_address());
    info!("  Shared Directory: {}", config.shared_dir.display());
    info!(
        "  Password: {}",
        if config.password_hash.is_some() {
            "bcrypt hash"
        } else {
            "plaintext"
        }
    );
    match config.idle_timeout() {
        Some(timeout) => info!("  Idle Timeout: {:?}", timeout),
        None => info!("  Idle Timeout: none"),
    }
    match config.max_connections {
        Some(limit) => info!("  Max Connections: {}", limit),
        None => info!("  Max Connections: unlimited"),
    }
    info!(
        "  Transfer Buffer Size: {} KB",
        config.transfer_buffer_size / 1024
    );
}
