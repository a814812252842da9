//! The deterministic engine: everything between the argument vector and
//! the spawned process.

pub mod ambiguity;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod help;
pub mod intent;
pub mod keyword;
pub mod memory;
pub mod oracle;
pub mod output;
pub mod paths;
pub mod pattern;
pub mod process;
pub mod prompt;
pub mod resolver;
pub mod rollback;
pub mod safety;
pub mod step;
pub mod synth;
pub mod time;
pub mod trace;
