//! Crash-report forwarding to the outbound markdown webhook.

pub mod markdown;
pub mod webhook;
