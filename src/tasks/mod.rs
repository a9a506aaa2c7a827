//! Tasks Module
//!
//! Background tasks that run alongside the HTTP server.

pub mod cleanup;

pub use cleanup::Sweeper;
