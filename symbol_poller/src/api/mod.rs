// @file: symbol_poller/src/api/mod.rs
// @description: Outbound side of the poller: durable output and subscriber fan-out.
// @author: LAS.

pub mod batch_sink;
pub mod json_store;
