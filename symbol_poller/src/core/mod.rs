// @file: symbol_poller/src/core/mod.rs
// @description: Exports the polling core and its data structures.
// @author: LAS.

pub mod collector;
pub mod engine;
pub mod errors;
pub mod fetcher;
pub mod interfaces;
pub mod models;
pub mod pacer;
pub mod resolver;
