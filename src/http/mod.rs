//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, access log, deadline)
//!     → handlers.rs (route dispatch)
//!     → request.rs (read body, parse, validate)
//!     → recorder/ (record interaction, run completion)
//!     → response.rs (success envelope or mapped error)
//!     → Send to client
//! ```

pub mod deadline;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use deadline::RequestDeadline;
pub use response::{ApiError, ErrorBody, SuccessBody};
pub use server::{AppState, HttpServer, ServerError};
