//! Shorturl - a small URL shortener service
//!
//! Issues short aliases for long URLs, redirects visitors and keeps
//! per-link visit statistics. Management endpoints are guarded by a
//! shared-secret token.
//!
//! # Architecture
//! - `storage`: the [`storage::UrlStore`] contract with memory and SQLite backends
//! - `services`: short code generation and GeoIP lookup
//! - `api`: HTTP handlers and middleware
//! - `config`: CLI, environment and file configuration
//! - `runtime`: startup wiring, server loop and shutdown
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
