//! cstash CLI library
//!
//! This module exports the CLI components for use in integration tests.

pub mod commands;
pub mod exit_code;
pub mod interrupt;
pub mod output;
pub mod prompt;
