//! Mode routing
//!
//! The server is currently the only execution mode; `generate-config` is
//! handled directly by the binary.

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "server")]
pub use server::run_server;
