//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (filter + format)
//!     → stdout (human-readable or JSON lines)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - `RUST_LOG` overrides the configured level
//! - Library code only emits events; installing a subscriber is left to
//!   binaries and tests

pub mod logging;

pub use logging::init_logging;
