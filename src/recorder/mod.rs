//! Interaction recording subsystem.
//!
//! # Data Flow
//! ```text
//! InteractionRequest (validated by the HTTP layer)
//!     → engine.rs (probe, timestamp, optional completion)
//!     → trace/ (storeInteraction span carries the record)
//!     → RecordOutcome back to the handler
//! ```
//!
//! Nothing is persisted locally; the trace backend owns the record once the
//! span is exported.

pub mod clock;
pub mod engine;
pub mod types;

pub use clock::{Clock, MonotonicClock, SystemClock};
pub use engine::InteractionRecorder;
pub use types::{InteractionRecord, InteractionRequest, RecordOutcome};
