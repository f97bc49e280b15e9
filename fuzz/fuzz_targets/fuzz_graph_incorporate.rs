//! Fuzz target for signature incorporation.
//!
//! Arbitrary readings and spike lists must either train the graph or be
//! rejected as a precondition violation, and the off state must survive.

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use psg_core::{PowerStateGraph, RunningStatistic, Signature, Spike, VertexId};

#[derive(Debug, Arbitrary)]
struct Input {
    readings: Vec<i16>,
    spikes: Vec<(u16, i16, u8)>,
    period_ms: u16,
}

fuzz_target!(|input: Input| {
    let readings: Vec<f64> = input.readings.iter().map(|&r| f64::from(r)).collect();
    let period = Duration::from_millis(u64::from(input.period_ms));
    let Ok(sig) = Signature::new(readings, period) else {
        return;
    };

    let spikes: Vec<Spike> = input
        .spikes
        .iter()
        .map(|&(index, delta, duration)| {
            Spike::new(usize::from(index), f64::from(delta), usize::from(duration))
        })
        .collect();

    let mut graph = PowerStateGraph::new();
    for result in [graph.incorporate(&sig, &spikes), graph.train(&sig)] {
        if let Err(err) = result {
            assert!(err.is_precondition());
        }
    }

    assert_eq!(
        graph.vertex(VertexId::OFF),
        Some(&RunningStatistic::from_value(0.0))
    );
    let summed: u64 = graph.edges().map(|(_, _, e)| e.count()).sum();
    assert_eq!(summed, graph.total_count());
});
