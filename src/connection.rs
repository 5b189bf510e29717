//! User-facing connection handle over the driver task.

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::driver::Driver;
use crate::session::ExchangeSession;
use crate::state::TelemetryState;
use crate::transport::{HttpTransport, Transport};
use crate::types::ControlInputs;
use crate::{LinkError, Result};

/// Live connection to the simulator.
///
/// Wraps the spawned exchange loop: control inputs go in through a watch
/// channel (latest value wins), telemetry snapshots come out as a stream.
/// Dropping the connection cancels the loop, which sends one final
/// neutral-controls exchange before exiting.
pub struct Connection {
    /// Snapshot watch receiver.
    states: watch::Receiver<Option<Arc<TelemetryState>>>,

    /// Control vector sender.
    controls: watch::Sender<ControlInputs>,

    /// Cancellation token for stopping the exchange loop.
    cancel: CancellationToken,
}

impl Connection {
    /// Connect to the simulator described by `config`.
    ///
    /// Spawns the exchange loop and waits briefly for the first telemetry
    /// snapshot; if the simulator is not answering yet the connection is
    /// still returned and snapshots begin once it does.
    pub async fn connect(config: BridgeConfig) -> Result<Self> {
        info!("Connecting to FlightAxis Link at {}", config.endpoint_url());
        let transport = HttpTransport::new(config.endpoint_url(), config.timeout());
        let connection = Self::with_transport(transport);

        let mut states = connection.states.clone();
        let first_frame = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                states.changed().await.ok();
                if states.borrow().is_some() {
                    break;
                }
            }
        })
        .await;

        if first_frame.is_err() {
            warn!("no telemetry from the simulator yet, continuing anyway");
        } else {
            info!("Simulator exchange established");
        }

        Ok(connection)
    }

    /// Build a connection over an arbitrary transport.
    ///
    /// This is the seam used by tests and by callers with their own
    /// framing; the exchange loop starts immediately.
    pub fn with_transport<T: Transport>(transport: T) -> Self {
        let session = ExchangeSession::new(transport);
        let channels = Driver::spawn(session, ControlInputs::neutral());
        Self { states: channels.states, controls: channels.controls, cancel: channels.cancel }
    }

    /// Replace the control vector used by subsequent exchanges.
    pub fn set_controls(&self, controls: ControlInputs) -> Result<()> {
        self.controls
            .send(controls)
            .map_err(|_| LinkError::transport_failed("exchange loop has shut down"))
    }

    /// Telemetry snapshots as a stream, one per applied reply.
    pub fn state_updates(&self) -> impl Stream<Item = Arc<TelemetryState>> + 'static {
        WatchStream::new(self.states.clone()).filter_map(|opt| async move { opt })
    }

    /// Most recent telemetry snapshot, if any reply has been applied yet.
    pub fn current_state(&self) -> Option<Arc<TelemetryState>> {
        self.states.borrow().clone()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!("Dropping simulator connection");
        // Cancel the exchange loop; it parks the model before exiting.
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedTransport, sample_frame_reply};
    use tokio::time::timeout;

    #[tokio::test(flavor = "multi_thread")]
    async fn snapshots_flow_through_the_stream_api() {
        let transport = ScriptedTransport::new([
            None,
            None,
            Some(sample_frame_reply(0.02)),
            Some(sample_frame_reply(0.04)),
        ]);
        let connection = Connection::with_transport(transport);

        let mut updates = Box::pin(connection.state_updates());
        let snapshot = timeout(Duration::from_secs(5), updates.next())
            .await
            .expect("snapshot should arrive")
            .expect("stream should not end yet");

        assert_eq!(snapshot.float("m-airspeed-MPS").unwrap(), 12.5);
        assert!(connection.current_state().is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn set_controls_reaches_the_exchange_loop() {
        let transport = ScriptedTransport::looping([
            None,
            None,
            Some(sample_frame_reply(0.02)),
        ]);
        let log = transport.log();
        let connection = Connection::with_transport(transport);

        let mut banked = [0.5; 12];
        banked[0] = 0.1234;
        connection.set_controls(ControlInputs::from(banked)).unwrap();

        timeout(Duration::from_secs(5), async {
            loop {
                {
                    let log = log.lock().unwrap();
                    if log.iter().any(|(_, body)| body.contains("<item>0.1234</item>")) {
                        break;
                    }
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("controls should reach the wire");
    }
}
