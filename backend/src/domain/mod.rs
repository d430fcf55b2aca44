//! Domain layer containing business rules and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `subscription` - Store-sourced subscription records, premium status, and
//!   receipt period rules

pub mod foundation;
pub mod subscription;
