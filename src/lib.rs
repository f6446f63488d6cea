//! Interaction logger library.
//!
//! Records question/response interactions, optionally runs them through a
//! language-model completion, and traces every step to LangSmith.

pub mod completion;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod recorder;
pub mod trace;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use recorder::InteractionRecorder;
pub use trace::TraceScope;
