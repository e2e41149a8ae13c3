//! `cblr`: an operator console for endpoint live response sessions.
//!
//! The binary is a thin wrapper over [`console::run`]; the modules are public
//! so integration tests can drive the console without a terminal.

pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod lexer;
pub mod logging;
pub mod output;
