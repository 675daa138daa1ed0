//! Common utilities for the OTA tools.
//!
//! This crate provides shared functionality for both halves of the update
//! pipeline:
//! - Asset namespaces (the URL prefixes the payload generator writes and the
//!   asset server mounts)
//! - Tracing subscriber setup

pub mod log;
pub mod namespace;
