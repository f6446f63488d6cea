//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides, read once in main)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → passed by value/Arc into each component constructor
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Components never read the environment themselves

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AppConfig;
pub use schema::CompletionConfig;
pub use schema::LangSmithConfig;
pub use schema::ObservabilityConfig;
pub use schema::PolicyKind;
pub use schema::ValidationConfig;
