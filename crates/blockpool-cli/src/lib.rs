//! blockpool CLI library: configuration, pool exercise, and report output.

pub mod app;
pub mod completion;
pub mod config;
pub mod errors;
pub mod report;
