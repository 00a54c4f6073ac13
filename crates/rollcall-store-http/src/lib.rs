//! HTTP backend for the rollcall stores.
//!
//! [`RemoteStore`] implements both store traits against the remote admin API,
//! translating HTTP failures into the shared error taxonomy. No retries are
//! performed; a transient fault surfaces as a network error and the operator
//! re-triggers the call.

mod client;

pub use client::{RemoteConfig, RemoteStore};
