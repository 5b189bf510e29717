//! Driver spawns and manages the exchange loop task.

use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::session::ExchangeSession;
use crate::state::TelemetryState;
use crate::transport::Transport;
use crate::types::ControlInputs;

/// Result of spawning the driver task.
pub struct DriverChannels {
    /// Receiver for telemetry snapshots, one per applied reply.
    pub states: watch::Receiver<Option<Arc<TelemetryState>>>,
    /// Sender for the control vector; latest value wins.
    pub controls: watch::Sender<ControlInputs>,
    /// Cancellation token for graceful shutdown.
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the exchange loop task.
///
/// The task owns the session and serializes everything: it re-issues the
/// activation handshake whenever the telemetry warrants it, runs one
/// exchange per iteration with the latest control vector, and publishes a
/// cloned state snapshot after every applied reply. On cancellation it
/// performs one final exchange with the neutral control vector so an
/// interrupted bridge never leaves the model at power.
pub struct Driver;

impl Driver {
    /// Spawn the exchange loop for the given session.
    pub fn spawn<T>(session: ExchangeSession<T>, initial: ControlInputs) -> DriverChannels
    where
        T: Transport,
    {
        let (state_tx, state_rx) = watch::channel(None);
        let (control_tx, control_rx) = watch::channel(initial);

        let cancel = CancellationToken::new();
        let cancel_loop = cancel.clone();

        tokio::spawn(async move {
            Self::exchange_loop(session, state_tx, control_rx, cancel_loop).await;
        });

        DriverChannels { states: state_rx, controls: control_tx, cancel }
    }

    /// Exchange loop task: activation, exchange, publish, repeat.
    async fn exchange_loop<T>(
        mut session: ExchangeSession<T>,
        state_tx: watch::Sender<Option<Arc<TelemetryState>>>,
        control_rx: watch::Receiver<ControlInputs>,
        cancel: CancellationToken,
    ) where
        T: Transport,
    {
        info!("exchange loop started");
        let mut error_count = 0u32;
        let mut published_frames = 0u64;
        const MAX_ERRORS: u32 = 10;

        loop {
            if cancel.is_cancelled() {
                info!("exchange loop cancelled");
                break;
            }

            if session.needs_activation() {
                let activated = tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("exchange loop cancelled during activation");
                        break;
                    }
                    result = session.activate() => result,
                };
                if let Err(e) = activated {
                    error_count += 1;
                    warn!("activation failed ({}/{}): {}", error_count, MAX_ERRORS, e);
                    if error_count >= MAX_ERRORS {
                        error!("too many activation failures, shutting down");
                        break;
                    }
                    tokio::time::sleep(backoff(error_count)).await;
                    continue;
                }
            }

            let controls = *control_rx.borrow();
            let frames_before = session.timing().socket_frames();

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    // A partial in-flight reply is discarded by dropping the
                    // exchange future; the final safe exchange follows.
                    info!("exchange loop cancelled during exchange");
                    break;
                }
                result = session.exchange(controls.as_slice()) => result,
            };

            match result {
                Ok(()) => {
                    error_count = 0;
                    if session.timing().socket_frames() == frames_before {
                        // Skipped frame: the simulator is not answering, so
                        // nothing paces the loop. Back off briefly.
                        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                        continue;
                    }
                    published_frames += 1;
                    if state_tx.send(Some(Arc::new(session.state().clone()))).is_err() {
                        debug!("state receiver dropped, shutting down");
                        break;
                    }
                }
                Err(e) => {
                    error_count += 1;
                    error!("exchange error ({}/{}): {}", error_count, MAX_ERRORS, e);
                    if error_count >= MAX_ERRORS {
                        error!("too many exchange errors, shutting down");
                        break;
                    }
                    tokio::time::sleep(backoff(error_count)).await;
                }
            }
        }

        // Final safe exchange: neutral sticks, throttle cut.
        if let Err(e) = session.exchange(ControlInputs::neutral().as_slice()).await {
            warn!("final safe exchange failed: {}", e);
        }
        let _ = state_tx.send(None);

        info!("exchange loop ended (published {} frames)", published_frames);
    }
}

/// Exponential backoff: 100ms, 200ms, 400ms, ... capped at 3.2s.
fn backoff(error_count: u32) -> std::time::Duration {
    std::time::Duration::from_millis(50 * (1 << error_count.min(6)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedTransport, sample_frame_reply};
    use tokio::time::{Duration, timeout};

    fn scripted_session(
        replies: impl IntoIterator<Item = Option<String>>,
    ) -> (ExchangeSession<ScriptedTransport>, std::sync::Arc<std::sync::Mutex<Vec<(String, String)>>>)
    {
        let transport = ScriptedTransport::new(replies);
        let log = transport.log();
        (ExchangeSession::new(transport), log)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn driver_activates_then_publishes_snapshots() {
        // Two activation requests answer empty; the exchanges then confirm
        // the controller as active so activation is not re-issued.
        let (session, log) = scripted_session([
            None,
            None,
            Some(sample_frame_reply(0.02)),
            Some(sample_frame_reply(0.04)),
        ]);
        let channels = Driver::spawn(session, ControlInputs::neutral());

        let mut states = channels.states.clone();
        let snapshot = timeout(Duration::from_secs(5), async {
            loop {
                if let Some(state) = states.borrow_and_update().clone() {
                    break state;
                }
                states.changed().await.unwrap();
            }
        })
        .await
        .expect("driver should publish a snapshot");

        assert_eq!(snapshot.float("m-altitudeASL-MTR").unwrap(), 120.25);
        assert!(snapshot.controller_active());

        channels.cancel.cancel();

        let actions: Vec<String> = {
            let log = log.lock().unwrap();
            log.iter().map(|(a, _)| a.clone()).collect()
        };
        assert_eq!(actions[0], "RestoreOriginalControllerDevice");
        assert_eq!(actions[1], "InjectUAVControllerInterface");
        assert_eq!(actions[2], "ExchangeData");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancellation_sends_the_neutral_vector() {
        let (session, log) = scripted_session([
            None,
            None,
            Some(sample_frame_reply(0.02)),
            Some(sample_frame_reply(0.04)),
            Some(sample_frame_reply(0.06)),
        ]);
        let channels = Driver::spawn(session, ControlInputs::neutral());

        // Wait until at least one snapshot is out, then cancel.
        let mut states = channels.states.clone();
        timeout(Duration::from_secs(5), async {
            loop {
                if states.borrow_and_update().is_some() {
                    break;
                }
                states.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
        channels.cancel.cancel();

        // The loop ends by publishing None after the final safe exchange.
        timeout(Duration::from_secs(5), async {
            loop {
                if states.borrow_and_update().is_none() {
                    break;
                }
                states.changed().await.unwrap();
            }
        })
        .await
        .expect("driver should signal shutdown");

        let log = log.lock().unwrap();
        let (action, body) = log.last().unwrap();
        assert_eq!(action, "ExchangeData");
        let neutral = crate::soap::encode_exchange(ControlInputs::neutral().as_slice()).unwrap();
        assert_eq!(body, &neutral);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn driver_forwards_updated_controls() {
        let transport = ScriptedTransport::looping([
            None,
            None,
            Some(sample_frame_reply(0.02)),
            Some(sample_frame_reply(0.04)),
        ]);
        let log = transport.log();
        let session = ExchangeSession::new(transport);
        let channels = Driver::spawn(session, ControlInputs::neutral());

        let mut throttle_up = [0.0; 12];
        throttle_up[2] = 0.8123;
        channels.controls.send(ControlInputs::from(throttle_up)).unwrap();

        let mut states = channels.states.clone();
        timeout(Duration::from_secs(5), async {
            loop {
                states.changed().await.unwrap();
                if states.borrow().is_some() {
                    let log = log.lock().unwrap();
                    if log.iter().any(|(_, body)| body.contains("<item>0.8123</item>")) {
                        break;
                    }
                }
            }
        })
        .await
        .expect("updated controls should reach the wire");

        channels.cancel.cancel();
    }
}
