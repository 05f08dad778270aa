//! Domain model module declarations.

pub mod crash_report;
pub mod event;
pub mod tutorial;
