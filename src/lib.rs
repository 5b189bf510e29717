//! Type-safe Rust bridge for the RealFlight FlightAxis Link protocol.
//!
//! Flightlink lets a flight-control loop treat a remote RealFlight
//! simulator as a local sensor/actuator device: control-surface commands go
//! out as SOAP envelopes, telemetry replies come back as typed snapshots.
//!
//! # Features
//!
//! - **Typed telemetry**: every reply field lands in a closed tagged union
//!   with a fixed tag vocabulary, no stringly-typed reads
//! - **Session lifecycle**: idempotent controller activation with automatic
//!   re-activation when the simulator drops or resets the interface
//! - **Frame timing**: smoothed physics-frame duration for stall detection
//! - **Resilience**: timeouts and dropped replies are skipped frames, never
//!   crashes
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use flightlink::{BridgeConfig, FlightLink};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> flightlink::Result<()> {
//!     let connection = FlightLink::connect(BridgeConfig::default()).await?;
//!     let mut states = Box::pin(connection.state_updates());
//!
//!     while let Some(state) = states.next().await {
//!         println!("ASL: {} m", state.float("m-altitudeASL-MTR")?);
//!         // Manual pass-through: mirror the transmitter sticks.
//!         connection.set_controls(state.receiver_controls())?;
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod config;
mod error;
pub mod types;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;

// Exchange protocol
pub mod soap;
mod state;
mod timing;

// Session and transport architecture
pub mod connection;
pub mod driver;
pub mod session;
pub mod transport;

// Core exports
pub use config::{BridgeConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT_MS, SimParameter};
pub use error::*;
pub use state::{
    TAG_AIRCRAFT_STATUS, TAG_CONTROLLER_ACTIVE, TAG_PHYSICS_TIME, TAG_RESET_PRESSED,
    TelemetryState,
};
pub use timing::FrameTiming;
pub use types::*;

// Session architecture exports
pub use connection::Connection;
pub use session::{ExchangeSession, SessionPhase};
pub use transport::{HttpTransport, Transport};

/// Unified entry point for simulator connections.
///
/// # Example
///
/// ```rust,no_run
/// use flightlink::{BridgeConfig, FlightLink};
///
/// #[tokio::main]
/// async fn main() -> flightlink::Result<()> {
///     let connection = FlightLink::connect(BridgeConfig::default()).await?;
///     // Use connection...
///     Ok(())
/// }
/// ```
pub struct FlightLink;

impl FlightLink {
    /// Connect to a FlightAxis Link simulator.
    ///
    /// Spawns the exchange loop against the configured endpoint. The
    /// connection is returned even if the simulator is not answering yet;
    /// telemetry begins streaming once it does.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange loop cannot be spawned or the
    /// configuration is unusable.
    pub async fn connect(config: BridgeConfig) -> Result<Connection> {
        Connection::connect(config).await
    }
}
