//! Observability infrastructure for FxRate
//!
//! This crate provides structured logging via tracing.
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("fxrate", LogFormat::Pretty, "info")?;
//! ```

pub mod logging;

pub use logging::{init_logging, LogFormat, DEFAULT_LOG_LEVEL};
