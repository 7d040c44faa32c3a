//! Command handlers.

pub mod check_deps;
pub mod prompt;
pub mod run;
