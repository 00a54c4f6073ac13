//! Core types and trait definitions for the rollcall personnel registry.
//!
//! This crate is deliberately free of HTTP and storage dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod linkage;
pub mod provision;
pub mod record;
pub mod search;
pub mod service;
pub mod store;
pub mod unified;

pub use error::{Error, ErrorKind, Result};
