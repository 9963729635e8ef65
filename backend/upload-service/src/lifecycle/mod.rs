//! Process lifecycle: clean (re)binding of the listening port and graceful
//! shutdown on SIGINT/SIGTERM.

pub mod port_guard;
pub mod shutdown;

pub use port_guard::{PortBindError, PortGuard};
pub use shutdown::{shutdown_signal, ShutdownCoordinator};
