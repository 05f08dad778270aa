//! Event handler sub-modules, one per routed event family.

pub mod message;
pub mod onboarding;
pub mod task;
