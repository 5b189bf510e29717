//! Bridge configuration.
//!
//! Everything the bridge needs to reach the simulator is static: the
//! endpoint, the request timeout, and the table of autopilot parameter
//! defaults the flight-control side applies at startup. The whole struct
//! is immutable once built and is passed explicitly to whoever needs it.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{LinkError, Result};

/// Default simulator host.
pub const DEFAULT_HOST: &str = "192.168.0.5";
/// Default FlightAxis Link port.
pub const DEFAULT_PORT: u16 = 18083;
/// Default request timeout in milliseconds, sized to the frame cadence.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Autopilot parameter defaults applied at startup: (name, value, persist).
///
/// RC endpoints are persisted so a re-calibrated transmitter survives a
/// restart; the IMU offset/scale seeds are per-boot only. RC2 is reversed
/// because the InterLink controller ships with a reversed elevator axis.
static PARAMETER_DEFAULTS: &[(&str, f64, bool)] = &[
    ("AHRS_EKF_TYPE", 10.0, false),
    ("INS_GYR_CAL", 0.0, false),
    ("RC1_MIN", 1000.0, true),
    ("RC1_MAX", 2000.0, true),
    ("RC2_MIN", 1000.0, true),
    ("RC2_MAX", 2000.0, true),
    ("RC3_MIN", 1000.0, true),
    ("RC3_MAX", 2000.0, true),
    ("RC4_MIN", 1000.0, true),
    ("RC4_MAX", 2000.0, true),
    ("RC2_REVERSED", 1.0, false),
    ("SERVO1_MIN", 1000.0, false),
    ("SERVO1_MAX", 2000.0, false),
    ("SERVO2_MIN", 1000.0, false),
    ("SERVO2_MAX", 2000.0, false),
    ("SERVO3_MIN", 1000.0, false),
    ("SERVO3_MAX", 2000.0, false),
    ("SERVO4_MIN", 1000.0, false),
    ("SERVO4_MAX", 2000.0, false),
    ("SERVO5_MIN", 1000.0, false),
    ("SERVO5_MAX", 2000.0, false),
    ("SERVO6_MIN", 1000.0, false),
    ("SERVO6_MAX", 2000.0, false),
    ("INS_ACC2OFFS_X", 0.001, false),
    ("INS_ACC2OFFS_Y", 0.001, false),
    ("INS_ACC2OFFS_Z", 0.001, false),
    ("INS_ACC2SCAL_X", 1.001, false),
    ("INS_ACC2SCAL_Y", 1.001, false),
    ("INS_ACC2SCAL_Z", 1.001, false),
    ("INS_ACCOFFS_X", 0.001, false),
    ("INS_ACCOFFS_Y", 0.001, false),
    ("INS_ACCOFFS_Z", 0.001, false),
    ("INS_ACCSCAL_X", 1.001, false),
    ("INS_ACCSCAL_Y", 1.001, false),
    ("INS_ACCSCAL_Z", 1.001, false),
];

/// One autopilot parameter default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParameter {
    pub name: String,
    pub value: f64,
    /// Whether the parameter should be written back to persistent storage.
    pub persistent: bool,
}

/// Static configuration for one bridge instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Simulator host name or address.
    pub host: String,
    /// FlightAxis Link port.
    pub port: u16,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Autopilot parameter defaults for the flight-control collaborator.
    pub parameters: Vec<SimParameter>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            parameters: Self::default_parameters(),
        }
    }
}

impl BridgeConfig {
    /// The built-in autopilot parameter table.
    pub fn default_parameters() -> Vec<SimParameter> {
        PARAMETER_DEFAULTS
            .iter()
            .map(|&(name, value, persistent)| SimParameter {
                name: name.to_string(),
                value,
                persistent,
            })
            .collect()
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| LinkError::Config {
            details: format!("cannot read {}", path.display()),
            source: Some(Box::new(err)),
        })?;
        Self::from_yaml_str(&text)
    }

    /// HTTP endpoint URL for the simulator.
    pub fn endpoint_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
