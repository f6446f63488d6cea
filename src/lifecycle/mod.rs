//! Process lifecycle management.
//!
//! # Data Flow
//! ```text
//! signals.rs (Ctrl+C / SIGTERM)
//!     → shutdown.rs (broadcast to subscribers)
//!     → HttpServer stops accepting, drains in-flight requests
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
