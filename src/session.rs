//! Exchange session: activation lifecycle and the per-cycle protocol.

use tracing::{debug, info, trace};

use crate::soap::{
    ACTION_EXCHANGE_DATA, ACTION_INJECT_CONTROLLER, ACTION_RESET_AIRCRAFT,
    ACTION_RESTORE_CONTROLLER, decode_reply, encode_exchange, encode_inject, encode_reset,
    encode_restore,
};
use crate::state::TelemetryState;
use crate::timing::FrameTiming;
use crate::transport::Transport;
use crate::Result;

/// Lifecycle of the simulator-side controller handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No activation sequence has been issued yet.
    Uninitialized,
    /// Restore + inject have been sent; the simulator should be treating
    /// this client as its active external controller.
    Active,
}

/// One synchronous exchange session against the simulator.
///
/// Owns the transport, the telemetry store and the frame-timing estimator.
/// One session means one logical thread of control: exchanges never
/// overlap, and the telemetry store is only ever written between the
/// decode and timing steps of a cycle.
pub struct ExchangeSession<T: Transport> {
    transport: T,
    state: TelemetryState,
    timing: FrameTiming,
    phase: SessionPhase,
    frame_counter: u64,
    activation_frame: u64,
}

impl<T: Transport> ExchangeSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: TelemetryState::new(),
            timing: FrameTiming::new(),
            phase: SessionPhase::Uninitialized,
            frame_counter: 0,
            activation_frame: 0,
        }
    }

    /// Install this client as the simulator's active controller.
    ///
    /// Issues the restore action followed by the inject action. Safe to
    /// invoke any number of times; the outer loop should call it again
    /// whenever [`needs_activation`](Self::needs_activation) reports so.
    pub async fn activate(&mut self) -> Result<()> {
        debug!("sending controller activation sequence");
        self.transport.request(ACTION_RESTORE_CONTROLLER, &encode_restore()).await?;
        self.transport.request(ACTION_INJECT_CONTROLLER, &encode_inject()).await?;
        self.activation_frame = self.frame_counter;
        self.phase = SessionPhase::Active;
        info!(activation_frame = self.activation_frame, "controller interface activation sent");
        Ok(())
    }

    /// Whether the activation sequence should be (re)issued.
    ///
    /// True before the first activation, and again whenever the telemetry
    /// reports the controller interface inactive or the simulator's reset
    /// control pressed.
    pub fn needs_activation(&self) -> bool {
        self.phase == SessionPhase::Uninitialized
            || !self.state.controller_active()
            || self.state.reset_pressed()
    }

    /// Ask the simulator to reset the aircraft to its spawn state.
    pub async fn reset_aircraft(&mut self) -> Result<()> {
        info!("requesting aircraft reset");
        self.transport.request(ACTION_RESET_AIRCRAFT, &encode_reset()).await?;
        Ok(())
    }

    /// Run one exchange cycle: controls out, telemetry in.
    ///
    /// A control vector of the wrong length is rejected before any I/O.
    /// An empty reply advances only the attempt counter and is not an
    /// error. A malformed reply is an error for this cycle and leaves the
    /// telemetry store untouched: the batch is fully decoded before any
    /// of it is applied.
    pub async fn exchange(&mut self, channels: &[f64]) -> Result<()> {
        let envelope = encode_exchange(channels)?;
        let reply = self.transport.request(ACTION_EXCHANGE_DATA, &envelope).await?;
        self.frame_counter += 1;

        let Some(reply) = reply else {
            trace!(frame = self.frame_counter, "no reply, frame skipped");
            return Ok(());
        };

        let updates = decode_reply(&reply)?;
        self.state.apply_batch(updates);
        // The estimator recorded its baseline before this apply, so it
        // observes the delta across the exchange.
        self.timing.observe(self.state.physics_time());
        trace!(
            frame = self.frame_counter,
            physics_time = self.state.physics_time(),
            "exchange applied"
        );
        Ok(())
    }

    /// Telemetry snapshot as of the last applied reply.
    pub fn state(&self) -> &TelemetryState {
        &self.state
    }

    /// Frame-timing estimator fed by the replies.
    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Exchange attempts issued, with or without a reply.
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// Value of the attempt counter when activation was last issued.
    pub fn activation_frame(&self) -> u64 {
        self.activation_frame
    }
}
