//! problemdesk library
//!
//! Exposes the response cache, the API clients and the CLI so that the
//! binary and the integration tests share one implementation.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod output;
