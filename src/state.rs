//! Fixed-vocabulary telemetry state store.
//!
//! The simulator's reply vocabulary is closed: 12 positional receiver
//! channels plus the named aircraft-state and notification tags below. The
//! key set is declared once in [`DEFAULTS`] and never changes at runtime;
//! a reply can only overwrite values, never introduce keys. Reads of tags
//! outside the vocabulary fail loudly; writes for unknown tags are dropped.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use serde::Serialize;
use tracing::trace;

use crate::types::{CHANNEL_COUNT, ControlInputs, TelemetryValue};
use crate::{LinkError, Result};

/// Tag reporting the simulator's physics clock, in seconds.
pub const TAG_PHYSICS_TIME: &str = "m-currentPhysicsTime-SEC";
/// Tag reporting whether this client is the active external controller.
pub const TAG_CONTROLLER_ACTIVE: &str = "m-flightAxisControllerIsActive";
/// Tag reporting that the simulator's reset control was pressed.
pub const TAG_RESET_PRESSED: &str = "m-resetButtonHasBeenPressed";
/// Tag reporting the coarse aircraft status string.
pub const TAG_AIRCRAFT_STATUS: &str = "m-currentAircraftStatus";

/// Seed value for one vocabulary entry; also fixes the tag's kind.
#[derive(Debug, Clone, Copy)]
enum Seed {
    F(f64),
    B(bool),
    T(&'static str),
}

impl Seed {
    fn value(self) -> TelemetryValue {
        match self {
            Seed::F(v) => TelemetryValue::Float(v),
            Seed::B(v) => TelemetryValue::Bool(v),
            Seed::T(v) => TelemetryValue::Text(v.to_owned()),
        }
    }
}

/// The complete telemetry vocabulary with per-tag initial values.
///
/// Receiver channels default to mid-stick except the throttle channel;
/// battery and rotor tags start at -1 (the simulator's "not reported"
/// marker); the status flags start with the model parked on the ground
/// with an engine running, which is what a freshly loaded aircraft reports.
static DEFAULTS: &[(&str, Seed)] = &[
    ("rcin0", Seed::F(0.5)),
    ("rcin1", Seed::F(0.5)),
    ("rcin2", Seed::F(0.0)),
    ("rcin3", Seed::F(0.5)),
    ("rcin4", Seed::F(0.0)),
    ("rcin5", Seed::F(0.0)),
    ("rcin6", Seed::F(0.0)),
    ("rcin7", Seed::F(0.0)),
    ("rcin8", Seed::F(0.0)),
    ("rcin9", Seed::F(0.0)),
    ("rcin10", Seed::F(0.0)),
    ("rcin11", Seed::F(0.0)),
    (TAG_PHYSICS_TIME, Seed::F(0.0)),
    ("m-currentPhysicsSpeedMultiplier", Seed::F(1.0)),
    ("m-airspeed-MPS", Seed::F(0.0)),
    ("m-altitudeASL-MTR", Seed::F(0.0)),
    ("m-altitudeAGL-MTR", Seed::F(0.0)),
    ("m-groundspeed-MPS", Seed::F(0.0)),
    ("m-pitchRate-DEGpSEC", Seed::F(0.0)),
    ("m-rollRate-DEGpSEC", Seed::F(0.0)),
    ("m-yawRate-DEGpSEC", Seed::F(0.0)),
    ("m-azimuth-DEG", Seed::F(0.0)),
    ("m-inclination-DEG", Seed::F(0.0)),
    ("m-roll-DEG", Seed::F(0.0)),
    ("m-orientationQuaternion-X", Seed::F(0.0)),
    ("m-orientationQuaternion-Y", Seed::F(0.0)),
    ("m-orientationQuaternion-Z", Seed::F(0.0)),
    ("m-orientationQuaternion-W", Seed::F(0.0)),
    ("m-aircraftPositionX-MTR", Seed::F(0.0)),
    ("m-aircraftPositionY-MTR", Seed::F(0.0)),
    ("m-velocityWorldU-MPS", Seed::F(0.0)),
    ("m-velocityWorldV-MPS", Seed::F(0.0)),
    ("m-velocityWorldW-MPS", Seed::F(0.0)),
    ("m-velocityBodyU-MPS", Seed::F(0.0)),
    ("m-velocityBodyV-MPS", Seed::F(0.0)),
    ("m-velocityBodyW-MPS", Seed::F(0.0)),
    ("m-accelerationWorldAX-MPS2", Seed::F(0.0)),
    ("m-accelerationWorldAY-MPS2", Seed::F(0.0)),
    ("m-accelerationWorldAZ-MPS2", Seed::F(0.0)),
    ("m-accelerationBodyAX-MPS2", Seed::F(0.0)),
    ("m-accelerationBodyAY-MPS2", Seed::F(0.0)),
    ("m-accelerationBodyAZ-MPS2", Seed::F(0.0)),
    ("m-windX-MPS", Seed::F(0.0)),
    ("m-windY-MPS", Seed::F(0.0)),
    ("m-windZ-MPS", Seed::F(0.0)),
    ("m-propRPM", Seed::F(0.0)),
    ("m-heliMainRotorRPM", Seed::F(-1.0)),
    ("m-batteryVoltage-VOLTS", Seed::F(-1.0)),
    ("m-batteryCurrentDraw-AMPS", Seed::F(-1.0)),
    ("m-batteryRemainingCapacity-MAH", Seed::F(-1.0)),
    ("m-fuelRemaining-OZ", Seed::F(0.0)),
    ("m-isLocked", Seed::B(false)),
    ("m-hasLostComponents", Seed::B(false)),
    ("m-anEngineIsRunning", Seed::B(true)),
    ("m-isTouchingGround", Seed::B(true)),
    (TAG_CONTROLLER_ACTIVE, Seed::B(false)),
    (TAG_AIRCRAFT_STATUS, Seed::T("CAS-FLYING")),
    (TAG_RESET_PRESSED, Seed::B(false)),
];

static VOCABULARY: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| DEFAULTS.iter().map(|(tag, _)| *tag).collect());

/// Whether a tag belongs to the fixed telemetry vocabulary.
pub(crate) fn is_known_tag(tag: &str) -> bool {
    VOCABULARY.contains(tag)
}

/// Mutable snapshot of the vehicle state reported by the simulator.
///
/// Exclusively owned by one exchange session; the driver publishes cloned
/// snapshots so readers never observe a half-applied batch.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryState {
    values: HashMap<&'static str, TelemetryValue>,
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryState {
    /// Fresh state with every tag at its documented initial value.
    pub fn new() -> Self {
        Self { values: DEFAULTS.iter().map(|(tag, seed)| (*tag, seed.value())).collect() }
    }

    /// Apply one decoded reply batch.
    ///
    /// Known tags are overwritten in place; unknown tags are dropped
    /// without error. Individual updates cannot fail here; coercion
    /// already happened at the codec boundary.
    pub fn apply_batch(&mut self, updates: impl IntoIterator<Item = (String, TelemetryValue)>) {
        for (tag, value) in updates {
            match self.values.get_mut(tag.as_str()) {
                Some(slot) => *slot = value,
                None => trace!(tag = %tag, "dropping update for tag outside the vocabulary"),
            }
        }
    }

    /// Strict read of one telemetry value.
    pub fn get(&self, tag: &str) -> Result<&TelemetryValue> {
        self.values.get(tag).ok_or_else(|| LinkError::unknown_tag(tag))
    }

    /// Numeric read; fails on unknown tags or non-float values.
    pub fn float(&self, tag: &str) -> Result<f64> {
        let value = self.get(tag)?;
        value.as_f64().ok_or_else(|| LinkError::TypeConversion {
            details: format!("tag '{tag}' holds {:?}, expected a float", value.kind()),
        })
    }

    /// Flag read; fails on unknown tags or non-boolean values.
    pub fn flag(&self, tag: &str) -> Result<bool> {
        let value = self.get(tag)?;
        value.as_bool().ok_or_else(|| LinkError::TypeConversion {
            details: format!("tag '{tag}' holds {:?}, expected a flag", value.kind()),
        })
    }

    /// Text read; fails on unknown tags or non-text values.
    pub fn text(&self, tag: &str) -> Result<&str> {
        let value = self.get(tag)?;
        value.as_str().ok_or_else(|| LinkError::TypeConversion {
            details: format!("tag '{tag}' holds {:?}, expected text", value.kind()),
        })
    }

    /// Simulator physics clock in seconds.
    pub fn physics_time(&self) -> f64 {
        self.float(TAG_PHYSICS_TIME).unwrap_or(0.0)
    }

    /// Whether the simulator reports this client as its active controller.
    pub fn controller_active(&self) -> bool {
        self.flag(TAG_CONTROLLER_ACTIVE).unwrap_or(false)
    }

    /// Whether the simulator's reset control has been pressed.
    pub fn reset_pressed(&self) -> bool {
        self.flag(TAG_RESET_PRESSED).unwrap_or(false)
    }

    /// Coarse aircraft status string as reported by the simulator.
    pub fn aircraft_status(&self) -> &str {
        self.text(TAG_AIRCRAFT_STATUS).unwrap_or("")
    }

    /// One receiver channel as last reported by the simulator.
    pub fn receiver_channel(&self, index: usize) -> Result<f64> {
        if index >= CHANNEL_COUNT {
            return Err(LinkError::unknown_tag(format!("rcin{index}")));
        }
        self.float(&format!("rcin{index}"))
    }

    /// Pass-through control vector mirroring the received channels.
    ///
    /// This is the manual-mode building block: feeding it back into the
    /// next exchange hands the transmitter sticks straight through.
    pub fn receiver_controls(&self) -> ControlInputs {
        let mut channels = [0.0; CHANNEL_COUNT];
        for (index, slot) in channels.iter_mut().enumerate() {
            *slot = self.receiver_channel(index).unwrap_or(0.0);
        }
        ControlInputs::from(channels)
    }

    /// Number of tags in the vocabulary.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// The vocabulary is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }
}
