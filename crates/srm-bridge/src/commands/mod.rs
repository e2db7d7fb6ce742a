//! Command handlers.

pub mod check;
pub mod config_cmd;
pub mod console;
pub mod run;
pub mod snapshot;
