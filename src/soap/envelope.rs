//! Outbound request envelope construction.

use crate::types::CHANNEL_COUNT;
use crate::{LinkError, Result};

/// soapaction name: hand the controller back to the original RC device.
pub const ACTION_RESTORE_CONTROLLER: &str = "RestoreOriginalControllerDevice";
/// soapaction name: install this client as the active external controller.
pub const ACTION_INJECT_CONTROLLER: &str = "InjectUAVControllerInterface";
/// soapaction name: reset the aircraft to its spawn state.
pub const ACTION_RESET_AIRCRAFT: &str = "ResetAircraft";
/// soapaction name: one controls-out / telemetry-in exchange.
pub const ACTION_EXCHANGE_DATA: &str = "ExchangeData";

/// All 12 channels selected, as a bitmask.
const SELECTED_CHANNELS_MASK: &str = "4095";

/// Rough envelope size for the exchange body, used as a capacity hint.
const EXCHANGE_CAPACITY: usize = 640;

/// Wrap an action payload in the SOAP envelope shell.
fn envelope(action: &str, inner: &str) -> String {
    let mut out = String::with_capacity(200 + action.len() * 2 + inner.len());
    out.push_str("<?xml version='1.0' encoding='UTF-8'?>");
    out.push_str(
        "<soap:Envelope xmlns:soap='http://schemas.xmlsoap.org/soap/envelope/' \
         xmlns:xsd='http://www.w3.org/2001/XMLSchema' \
         xmlns:xsi='http://www.w3.org/2001/XMLSchema-instance'>",
    );
    out.push_str("<soap:Body>");
    out.push('<');
    out.push_str(action);
    out.push('>');
    out.push_str(inner);
    out.push_str("</");
    out.push_str(action);
    out.push('>');
    out.push_str("</soap:Body>");
    out.push_str("</soap:Envelope>");
    out
}

/// Envelope for [`ACTION_RESTORE_CONTROLLER`]. Static body.
pub fn encode_restore() -> String {
    envelope(ACTION_RESTORE_CONTROLLER, "<a>1</a><b>2</b>")
}

/// Envelope for [`ACTION_INJECT_CONTROLLER`]. Static body.
pub fn encode_inject() -> String {
    envelope(ACTION_INJECT_CONTROLLER, "<a>1</a><b>2</b>")
}

/// Envelope for [`ACTION_RESET_AIRCRAFT`]. Static body.
pub fn encode_reset() -> String {
    envelope(ACTION_RESET_AIRCRAFT, "")
}

/// Envelope for [`ACTION_EXCHANGE_DATA`] carrying one control vector.
///
/// Each channel is rendered as a fixed-point decimal with 4 digits after
/// the point, in channel order. Anything but exactly 12 channels is
/// rejected before any formatting happens.
pub fn encode_exchange(channels: &[f64]) -> Result<String> {
    if channels.len() != CHANNEL_COUNT {
        return Err(LinkError::ControlVectorLength { len: channels.len() });
    }

    let mut inner = String::with_capacity(EXCHANGE_CAPACITY);
    inner.push_str("<pControlInputs>");
    inner.push_str("<m-selectedChannels>");
    inner.push_str(SELECTED_CHANNELS_MASK);
    inner.push_str("</m-selectedChannels>");
    inner.push_str("<m-channelValues-0to1>");
    for value in channels {
        inner.push_str(&format!("<item>{value:.4}</item>"));
    }
    inner.push_str("</m-channelValues-0to1>");
    inner.push_str("</pControlInputs>");

    Ok(envelope(ACTION_EXCHANGE_DATA, &inner))
}

/// Byte length of an envelope body as it goes on the wire.
///
/// Transports that frame requests themselves must use this (UTF-8 byte
/// count), not the character count, for the content-length header.
pub fn body_byte_len(body: &str) -> usize {
    body.len()
}
