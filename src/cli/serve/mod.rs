//! Development server for Go WebAssembly packages.
//!
//! # Module Structure
//!
//! - `route` - classification by final path segment
//! - `path` - URL decoding and local path resolution
//! - `handler` - per-request dispatch
//! - `fs` - static files and directory indexes
//! - `response` - `Reply` and range handling

mod fs;
mod handler;
mod path;
mod response;
mod route;

#[cfg(all(test, unix))]
mod tests;

use crate::build::ArtifactBuilder;
use crate::config::{ConfigError, ServerConfig};
use crate::reload::ReloadChannel;
use crate::{debug, log};
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tiny_http::Server;

/// Errors raised while starting the server.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Address(#[from] ConfigError),

    #[error("failed to bind {0}: {1}")]
    Bind(SocketAddr, Box<dyn std::error::Error + Send + Sync>),

    #[error("listener has no IP address")]
    NoAddress,
}

/// State shared by all request threads.
pub struct ServerState {
    pub config: Arc<ServerConfig>,
    pub builder: ArtifactBuilder,
    pub reload: ReloadChannel,
}

impl ServerState {
    pub fn new(config: Arc<ServerConfig>, builder: ArtifactBuilder) -> Self {
        Self {
            config,
            builder,
            reload: ReloadChannel::new(),
        }
    }
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    state: Arc<ServerState>,
}

/// Bind the HTTP server without starting the request loop.
pub fn bind(state: Arc<ServerState>) -> Result<BoundServer, ServeError> {
    let requested = state.config.bind_addr()?;
    let server = Server::http(requested).map_err(|e| ServeError::Bind(requested, e))?;
    let addr = server.server_addr().to_ip().ok_or(ServeError::NoAddress)?;

    Ok(BoundServer {
        server: Arc::new(server),
        addr,
        state,
    })
}

impl BoundServer {
    /// Get the bound address (the real port when bound to port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Server handle for shutdown registration.
    pub fn server(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }

    /// Start the request loop (blocking).
    ///
    /// Returns once the server is unblocked; pending waits are cancelled
    /// before returning.
    pub fn run(self) -> Result<()> {
        for request in self.server.incoming_requests() {
            if crate::core::is_shutdown() {
                break;
            }
            let state = Arc::clone(&self.state);
            let spawned = thread::Builder::new()
                .name("wasmserve-request".into())
                .spawn(move || {
                    if let Err(e) = handler::handle_request(request, &state) {
                        debug!("serve"; "request error: {e:#}");
                    }
                });
            if let Err(e) = spawned {
                log!("serve"; "failed to spawn request thread: {e}");
            }
        }
        self.state.reload.close();
        Ok(())
    }
}
