//! Currency Converter TWD table manager library
//!
//! This module exposes the table lifecycle, configuration and CLI modules
//! for use by the binary and in integration tests.

pub mod cli;
pub mod config;
pub mod table;
