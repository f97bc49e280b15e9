//! Fuzz target for graph tuning file parsing.
//!
//! Parsing and validating arbitrary JSON must return an error, never panic,
//! and a config that validates must build a graph.

#![no_main]

use libfuzzer_sys::fuzz_target;
use psg_config::{validate_config, GraphConfig};
use psg_core::PowerStateGraph;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<GraphConfig>(data) else {
        return;
    };
    if validate_config(&config).is_ok() {
        assert!(PowerStateGraph::with_config(config).is_ok());
    }
});
