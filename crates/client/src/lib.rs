//! Snapshot sources for the manifest pipeline.
//!
//! A [`SnapshotSource`] delivers the raw entity states, service domains and
//! version label one discovery run works from:
//! - [`HaClient`]: live HTTP API with bearer auth and retry
//! - [`DemoSource`]: a small built-in snapshot
//! - [`EmptySource`]: nothing at all

pub mod demo;
pub mod error;
pub mod http;
pub mod source;

pub use demo::{DemoSource, EmptySource};
pub use error::FetchError;
pub use http::HaClient;
pub use source::{fetch_snapshot, Snapshot, SnapshotSource};
