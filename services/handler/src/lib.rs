//! Function handler for the lambda-efs stack.
//!
//! `handler` holds the file write/read against the mount, `runtime` speaks the
//! function service's custom-runtime HTTP API, and `config` loads settings
//! from the environment the service injects.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod handler;
pub mod runtime;
