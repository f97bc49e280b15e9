//! Recorded power-reading time series for one appliance.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// An immutable, zero-cropped sequence of readings at a fixed period.
///
/// Readings are usually watts. Leading and trailing zero readings (idle
/// padding around the device's active cycle) are removed on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    readings: Vec<f64>,
    sample_period: Duration,
    leading_zeros: usize,
    device_name: Option<String>,
    id: Option<String>,
    recorded_at: Option<DateTime<Utc>>,
}

impl Signature {
    /// Build a signature, cropping zero padding from both ends.
    pub fn new(readings: impl Into<Vec<f64>>, sample_period: Duration) -> Result<Self> {
        if sample_period.is_zero() {
            return Err(Error::InvalidSamplePeriod);
        }

        let mut readings = readings.into();
        let first = readings
            .iter()
            .position(|&x| x != 0.0)
            .ok_or(Error::EmptySignature)?;
        let last = readings
            .iter()
            .rposition(|&x| x != 0.0)
            .ok_or(Error::EmptySignature)?;
        readings.truncate(last + 1);
        readings.drain(..first);

        Ok(Self {
            readings,
            sample_period,
            leading_zeros: first,
            device_name: None,
            id: None,
            recorded_at: None,
        })
    }

    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Wall-clock time of the first *raw* reading, before cropping.
    pub fn with_recorded_at(mut self, at: DateTime<Utc>) -> Self {
        self.recorded_at = Some(at);
        self
    }

    pub fn readings(&self) -> &[f64] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Never true: construction rejects signatures that crop to nothing.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn sample_period(&self) -> Duration {
        self.sample_period
    }

    /// Number of zero readings removed from the front.
    pub fn leading_zeros(&self) -> usize {
        self.leading_zeros
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.recorded_at
    }

    /// Wall-clock time of the cropped reading at `index`.
    ///
    /// `None` without a recording time, or when the offset overflows.
    pub fn timestamp_of(&self, index: usize) -> Option<DateTime<Utc>> {
        let start = self.recorded_at?;
        let steps = u32::try_from(self.leading_zeros.checked_add(index)?).ok()?;
        let offset = chrono::Duration::from_std(self.sample_period.checked_mul(steps)?).ok()?;
        start.checked_add_signed(offset)
    }

    /// Total energy: Σ readings × sample period in seconds.
    pub fn energy_consumption(&self) -> f64 {
        self.readings.iter().sum::<f64>() * self.sample_period.as_secs_f64()
    }
}
