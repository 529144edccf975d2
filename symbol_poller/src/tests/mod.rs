// @file: symbol_poller/src/tests/mod.rs
// @description: Test suite for the polling core, sinks, connectors and configuration.
// @author: LAS.

mod support;

mod config_tests;
