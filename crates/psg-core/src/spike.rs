//! Gradient spikes: detection from a signature and salience selection.

use psg_config::SpikeDetectionConfig;
use serde::{Deserialize, Serialize};

use crate::signature::Signature;

/// An abrupt change in the reading gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    /// Position of the first gradient step of the change.
    pub index: usize,
    /// Signed size of the jump, summed over the merged gradient run.
    pub delta: f64,
    /// Gradient steps until the readings stabilize.
    pub duration: usize,
}

impl Spike {
    pub fn new(index: usize, delta: f64, duration: usize) -> Self {
        Self {
            index,
            delta,
            duration,
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.delta.abs()
    }
}

fn by_magnitude_desc(spikes: &mut [Spike]) {
    spikes.sort_by(|a, b| b.magnitude().total_cmp(&a.magnitude()));
}

/// Keep the `count` largest spikes by |delta|, returned in temporal order.
///
/// Ties on magnitude keep their input order.
pub fn select_salient(spikes: &[Spike], count: usize) -> Vec<Spike> {
    let mut selected = spikes.to_vec();
    by_magnitude_desc(&mut selected);
    selected.truncate(count);
    selected.sort_by_key(|s| s.index);
    selected
}

/// Detect spikes in a signature's gradient.
///
/// Consecutive same-sign gradient steps merge into one spike; a zero step
/// ends the run. Spikes below `min_magnitude` are dropped, and an
/// opposite-sign pair of similar size within `transient_look_ahead`
/// samples cancels out. The result is ordered by |delta| descending.
pub fn detect_spikes(signature: &Signature, config: &SpikeDetectionConfig) -> Vec<Spike> {
    let mut spikes: Vec<Spike> = merge_gradient_runs(signature.readings())
        .into_iter()
        .filter(|s| s.magnitude() >= config.min_magnitude)
        .collect();

    remove_transients(
        &mut spikes,
        config.transient_look_ahead,
        config.transient_tolerance,
    );
    by_magnitude_desc(&mut spikes);
    spikes
}

fn merge_gradient_runs(readings: &[f64]) -> Vec<Spike> {
    let mut merged = Vec::new();
    let mut current: Option<Spike> = None;

    for (i, step) in readings.windows(2).map(|w| w[1] - w[0]).enumerate() {
        match current.as_mut() {
            Some(run) if step != 0.0 && run.delta.signum() == step.signum() => {
                run.delta += step;
                run.duration += 1;
            }
            _ => {
                merged.extend(current.take());
                if step != 0.0 {
                    current = Some(Spike::new(i, step, 1));
                }
            }
        }
    }
    merged.extend(current);
    merged
}

/// `a / b` within `[1 - tolerance, 1 + tolerance]`.
fn roughly_equal(a: f64, b: f64, tolerance: f64) -> bool {
    if b == 0.0 {
        return a == 0.0;
    }
    let ratio = a / b;
    ratio >= 1.0 - tolerance && ratio <= 1.0 + tolerance
}

/// `spikes` must be in temporal order.
fn remove_transients(spikes: &mut Vec<Spike>, look_ahead: usize, tolerance: f64) {
    let mut i = 0;
    while i < spikes.len() {
        let anchor = spikes[i];
        let partner = spikes[i + 1..]
            .iter()
            .take_while(|later| later.index - anchor.index < look_ahead)
            .position(|later| roughly_equal(anchor.delta, -later.delta, tolerance))
            .map(|offset| i + 1 + offset);

        match partner {
            Some(j) => {
                spikes.remove(j);
                spikes.remove(i);
            }
            None => i += 1,
        }
    }
}
