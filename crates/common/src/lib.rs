//! Common types and utilities for FxRate
//!
//! This crate provides shared types and the error type used across
//! all FxRate crates.
//!
//! # Modules
//!
//! - [`error`] - Common error types
//! - [`types`] - Shared domain types (Side, Symbol, CurrencyPair, RawRate)

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
