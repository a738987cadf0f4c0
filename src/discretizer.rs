//! Quantization of continuous observations into table keys.

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    types::{DiscreteState, STATE_DIMS},
};

/// Maps a continuous observation vector to per-dimension bin indices.
///
/// Each dimension is quantized as `floor(value * bins[d])`. No clamping is
/// applied, so values outside `[0, 1)` land in bins outside `0..bins[d]`
/// (negative velocities produce negative indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discretizer {
    bins: [u32; STATE_DIMS],
}

impl Discretizer {
    /// Create a discretizer with the given bin count per dimension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if any dimension has zero bins.
    pub fn new(bins: [u32; STATE_DIMS]) -> Result<Self> {
        if let Some(dim) = bins.iter().position(|&b| b == 0) {
            return Err(Error::invalid_config(format!(
                "dimension {dim} must have at least one bin"
            )));
        }
        Ok(Self { bins })
    }

    /// Bin counts per dimension.
    pub fn bins(&self) -> [u32; STATE_DIMS] {
        self.bins
    }

    /// Quantize one observation.
    pub fn discretize(&self, values: &[f64; STATE_DIMS]) -> DiscreteState {
        let mut out = [0i64; STATE_DIMS];
        for (slot, (&value, &bins)) in out.iter_mut().zip(values.iter().zip(self.bins.iter())) {
            *slot = (value * f64::from(bins)).floor() as i64;
        }
        DiscreteState::new(out)
    }

    /// Number of in-range cells (product of bin counts).
    pub fn state_space_size(&self) -> u64 {
        self.bins.iter().map(|&b| u64::from(b)).product()
    }
}

impl Default for Discretizer {
    fn default() -> Self {
        Self {
            bins: [12, 12, 2, 2, 12, 12],
        }
    }
}
