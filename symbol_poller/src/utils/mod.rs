// @file: symbol_poller/src/utils/mod.rs
// @description: Configuration, clock and logging helpers.
// @author: LAS.

pub mod clock;
pub mod config;
pub mod logger;
