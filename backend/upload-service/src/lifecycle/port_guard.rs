/// Port lifecycle guard
///
/// Makes restarts deterministic when a previous instance is slow to die:
/// best-effort kill of whatever holds the port, then poll until the port can
/// be bound or the deadline passes. The successfully bound listener is
/// handed to the HTTP server as-is, so there is no window between the probe
/// and the real bind. Running out of time is fatal.
use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::LifecycleConfig;

#[derive(Debug, Error)]
pub enum PortBindError {
    #[error("invalid bind address {address}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("port {port} is still busy after {timeout:?}: {source}")]
    StillBusy {
        port: u16,
        timeout: Duration,
        #[source]
        source: io::Error,
    },
}

#[derive(Clone, Debug)]
pub struct PortGuard {
    host: String,
    port: u16,
    timeout: Duration,
    poll_interval: Duration,
    reclaim: bool,
}

impl PortGuard {
    pub fn new(host: impl Into<String>, port: u16, cfg: &LifecycleConfig) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: cfg.port_release_timeout(),
            poll_interval: cfg.port_poll_interval(),
            reclaim: cfg.reclaim_port,
        }
    }

    /// Reclaim (if enabled) and bind the port
    pub async fn acquire(&self) -> Result<TcpListener, PortBindError> {
        if self.reclaim {
            self.reclaim_port().await;
        }
        self.wait_for_release().await
    }

    /// Kill any process bound to the port. Non-fatal: a missing `fuser`
    /// binary or an idle port are both fine.
    async fn reclaim_port(&self) {
        info!(port = self.port, "Cleaning any process using port");
        let target = format!("{}/tcp", self.port);
        match Command::new("fuser").args(["-k", &target]).output().await {
            Ok(output) if output.status.success() => {
                info!(port = self.port, "Terminated previous holder of port")
            }
            Ok(_) => debug!(port = self.port, "No process was holding the port"),
            Err(err) => warn!(port = self.port, "Could not run fuser: {}", err),
        }
    }

    /// Poll until the port binds or the timeout elapses
    pub async fn wait_for_release(&self) -> Result<TcpListener, PortBindError> {
        let addrs = self.resolve()?;
        let deadline = Instant::now() + self.timeout;

        loop {
            match TcpListener::bind(&addrs[..]) {
                Ok(listener) => {
                    info!(port = self.port, "Port is free");
                    return Ok(listener);
                }
                Err(err) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(PortBindError::StillBusy {
                            port: self.port,
                            timeout: self.timeout,
                            source: err,
                        });
                    }
                    debug!(port = self.port, "Port busy, retrying: {}", err);
                    sleep(self.poll_interval.min(deadline - now)).await;
                }
            }
        }
    }

    fn resolve(&self) -> Result<Vec<SocketAddr>, PortBindError> {
        let address = format!("{}:{}", self.host, self.port);
        let invalid = |source| PortBindError::InvalidAddress {
            address: address.clone(),
            source,
        };

        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(invalid)?
            .collect();
        if addrs.is_empty() {
            return Err(invalid(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "host resolved to no addresses",
            )));
        }
        Ok(addrs)
    }
}
