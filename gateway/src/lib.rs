//! Presign Gateway service
//!
//! Issues presigned URLs and performs delete and copy operations against an
//! S3-compatible object store on behalf of clients that hold no storage
//! credentials.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Request middleware: panic guard, access log and authorization
pub mod middleware;

/// Handler modules
pub mod routes;

/// Server setup and startup
pub mod server;

/// Application state
pub mod state;

/// Configuration, errors and shared types
pub mod types;
