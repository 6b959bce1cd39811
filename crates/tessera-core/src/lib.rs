//! Core types and errors for the Tessera layout engine.
//!
//! This crate provides the foundational types used across the other tessera crates:
//! - Cell geometry (`Point`, `Size`, `Rect`)
//! - Axis, edge and operator enums shared by layout expressions
//! - View identifiers
//! - Error types

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::*;
