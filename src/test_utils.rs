//! Test utilities shared across unit tests and benches.
//!
//! The wire dialect is small enough to synthesize inline, so fixtures are
//! built programmatically instead of shipping recorded captures.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::transport::Transport;

/// Transport that replays a scripted sequence of replies and records every
/// request it sees. Once the script is exhausted it reports empty replies.
pub struct ScriptedTransport {
    replies: VecDeque<Option<String>>,
    repeat_last: bool,
    last: Option<String>,
    log: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Option<String>>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            repeat_last: false,
            last: None,
            log: Arc::default(),
        }
    }

    /// Like [`new`](Self::new), but once the script is exhausted the last
    /// reply repeats forever instead of going silent.
    pub fn looping(replies: impl IntoIterator<Item = Option<String>>) -> Self {
        let mut transport = Self::new(replies);
        transport.repeat_last = true;
        transport
    }

    /// Shared handle to the request log, usable after the transport has
    /// been moved into a session.
    pub fn log(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        Arc::clone(&self.log)
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn request(&mut self, action: &str, body: &str) -> crate::Result<Option<String>> {
        self.log.lock().unwrap().push((action.to_owned(), body.to_owned()));
        match self.replies.pop_front() {
            Some(reply) => {
                if let Some(text) = &reply {
                    self.last = Some(text.clone());
                }
                Ok(reply)
            }
            None if self.repeat_last => Ok(self.last.clone()),
            None => Ok(None),
        }
    }
}

/// Build a complete reply document in the simulator's shape.
///
/// `channels` become `<item>` elements of the channel block inside the
/// previous-inputs group; `aircraft` and `notifications` become the tag
/// elements of the second and third groups.
pub fn sample_reply(
    channels: &[&str],
    aircraft: &[(&str, &str)],
    notifications: &[(&str, &str)],
) -> String {
    let mut doc = String::with_capacity(1024);
    doc.push_str("<?xml version='1.0' encoding='UTF-8'?>");
    doc.push_str(
        "<soap:Envelope xmlns:soap='http://schemas.xmlsoap.org/soap/envelope/' \
         xmlns:xsd='http://www.w3.org/2001/XMLSchema' \
         xmlns:xsi='http://www.w3.org/2001/XMLSchema-instance'>",
    );
    doc.push_str("<soap:Body><ReturnData>");

    doc.push_str("<m-previousInputsState><m-channelValues-0to1>");
    for value in channels {
        doc.push_str("<item>");
        doc.push_str(value);
        doc.push_str("</item>");
    }
    doc.push_str("</m-channelValues-0to1></m-previousInputsState>");

    doc.push_str("<m-aircraftState>");
    for (tag, value) in aircraft {
        push_element(&mut doc, tag, value);
    }
    doc.push_str("</m-aircraftState>");

    doc.push_str("<m-notifications>");
    for (tag, value) in notifications {
        push_element(&mut doc, tag, value);
    }
    doc.push_str("</m-notifications>");

    doc.push_str("</ReturnData></soap:Body></soap:Envelope>");
    doc
}

/// Reply carrying a plausible full telemetry frame at the given physics time.
pub fn sample_frame_reply(physics_time_s: f64) -> String {
    let time = format!("{physics_time_s}");
    sample_reply(
        &[
            "0.5000", "0.5000", "0.0000", "0.5000", "0", "0", "0", "0", "0", "0", "0", "0",
        ],
        &[
            ("m-currentPhysicsTime-SEC", &time),
            ("m-airspeed-MPS", "12.5"),
            ("m-altitudeASL-MTR", "120.25"),
            ("m-isTouchingGround", "false"),
            ("m-currentAircraftStatus", "CAS-FLYING"),
        ],
        &[("m-flightAxisControllerIsActive", "true")],
    )
}

fn push_element(doc: &mut String, tag: &str, value: &str) {
    doc.push('<');
    doc.push_str(tag);
    doc.push('>');
    doc.push_str(value);
    doc.push_str("</");
    doc.push_str(tag);
    doc.push('>');
}
