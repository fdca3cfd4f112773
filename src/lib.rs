//! Platform Gateway routes HTTP traffic to the service platform backends.
//!
//! Each inbound request is matched by path prefix against a fixed route
//! table and proxied verbatim to one backend (users, orders, payments,
//! notifications, providers, repairs, child-assistance, moving, cleaning).
//! Transport failures are counted per backend and answered with a
//! structured 503, and `GET /health` aggregates the liveness of every
//! backend on demand.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate, health).
//! - [`config`] -- Configuration loading from defaults, file and environment,
//!   plus validation.
//! - [`docs`] -- `GET /` and `GET /api-docs` service directory.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`failure`] -- Consecutive failure tracking and the critical alert hook.
//! - [`health`] -- Bounded-retry backend probes and the `GET /health` report.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- Request forwarding, content negotiation, and the fallback
//!   unavailable response.
//! - [`routes`] -- First-match prefix route table.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `sentry-integration` | Sentry error tracking and failure alerts |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

// Library half of the binary; items are public for the CLI and tests only.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod docs;
pub mod error;
pub mod failure;
pub mod health;
pub mod logging;
pub mod proxy;
pub mod routes;
pub mod server;

#[cfg(feature = "sentry-integration")]
pub mod sentry_integration;
