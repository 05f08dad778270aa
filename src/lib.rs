#![forbid(unsafe_code)]

//! Slack event relay: onboarding tutorial tracking and crash-report
//! forwarding to a WeCom group-robot webhook.

pub mod config;
pub mod errors;
pub mod forward;
pub mod models;
pub mod server;
pub mod slack;
pub mod store;

pub use config::RelayConfig;
pub use errors::{AppError, Result};
