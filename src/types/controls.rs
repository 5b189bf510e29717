//! Control-surface input vector exchanged with the simulator.

use serde::{Deserialize, Serialize};

use crate::{LinkError, Result};

/// Number of receiver/control channels carried in every exchange.
pub const CHANNEL_COUNT: usize = 12;

/// Normalized control inputs for one exchange cycle.
///
/// Each channel is expected in `[0.0, 1.0]`; channel order matches the
/// simulator's receiver mapping (0 = aileron, 1 = elevator, 2 = throttle,
/// 3 = rudder on a conventional fixed-wing model).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlInputs {
    pub channels: [f64; CHANNEL_COUNT],
}

impl ControlInputs {
    /// Build from a slice, rejecting anything but exactly 12 channels.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let channels: [f64; CHANNEL_COUNT] = values
            .try_into()
            .map_err(|_| LinkError::ControlVectorLength { len: values.len() })?;
        Ok(Self { channels })
    }

    /// Safe-shutdown vector: sticks centered, throttle low.
    ///
    /// This is the vector the driver sends as its final exchange so an
    /// interrupted bridge never leaves the model at power.
    pub fn neutral() -> Self {
        let mut channels = [0.0; CHANNEL_COUNT];
        channels[0] = 0.5;
        channels[1] = 0.5;
        channels[3] = 0.5;
        Self { channels }
    }

    /// Channel values in wire order.
    pub fn as_slice(&self) -> &[f64] {
        &self.channels
    }
}

impl From<[f64; CHANNEL_COUNT]> for ControlInputs {
    fn from(channels: [f64; CHANNEL_COUNT]) -> Self {
        Self { channels }
    }
}
