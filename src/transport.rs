//! Request/reply transport to the simulator.
//!
//! The exchange layer only needs one capability: send a framed request,
//! get the reply text back, or learn that no reply arrived in time. The
//! trait keeps that seam pluggable; the shipped implementation speaks
//! HTTP, which is how FlightAxis Link exposes its SOAP endpoint.

use std::time::Duration;

use tracing::{debug, warn};

use crate::Result;

/// Content type the simulator expects on every request.
const CONTENT_TYPE: &str = "text/xml;charset='UTF-8'";

/// Blocking-free request/reply seam to the simulator.
///
/// `Ok(None)` is the empty-reply signal: the request was sent but no
/// usable reply arrived within the transport's bounded timeout. Timeouts
/// and transient I/O failures must be reported this way, never as errors;
/// the exchange layer treats them as skipped frames. At-most-one-in-flight
/// follows from `&mut self` plus the session's sequential cycle.
#[async_trait::async_trait]
pub trait Transport: Send + 'static {
    /// Send one action envelope and wait for the reply text.
    async fn request(&mut self, action: &str, body: &str) -> Result<Option<String>>;
}

/// HTTP transport backed by a keep-alive [`ureq::Agent`].
///
/// The agent enforces a global timeout sized to the simulator's frame
/// cadence; the blocking round-trip runs on the blocking thread pool so
/// the driver task stays responsive to cancellation.
pub struct HttpTransport {
    url: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Build a transport for the simulator endpoint, e.g.
    /// `http://192.168.0.5:18083`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder().timeout_global(Some(timeout)).build();
        let url = url.into();
        debug!(url, ?timeout, "HTTP transport ready");
        Self { url, agent: config.into() }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn request(&mut self, action: &str, body: &str) -> Result<Option<String>> {
        let agent = self.agent.clone();
        let url = self.url.clone();
        let action = action.to_owned();
        let body = body.to_owned();

        let outcome = tokio::task::spawn_blocking(move || {
            agent
                .post(&url)
                .header("content-type", CONTENT_TYPE)
                .header("soapaction", &action)
                .send(body)
                .and_then(|mut response| response.body_mut().read_to_string())
        })
        .await;

        match outcome {
            Ok(Ok(reply)) => Ok(Some(reply)),
            Ok(Err(err)) => {
                // Timeouts and transient failures are skipped frames, not errors.
                warn!(error = %err, "no reply from simulator, skipping frame");
                Ok(None)
            }
            Err(join_err) => Err(crate::LinkError::transport_failed_with_source(
                "request task aborted",
                Box::new(join_err),
            )),
        }
    }
}
