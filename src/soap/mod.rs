//! SOAP envelope codec for the FlightAxis Link dialect.
//!
//! Outbound envelopes are built by string concatenation against the fixed
//! wire templates the simulator expects; inbound replies are parsed into a
//! batch of `(tag, value)` telemetry updates. The dialect itself is an
//! external contract and is reproduced byte-for-byte on the outbound side.

mod envelope;
mod reply;

pub use envelope::{
    ACTION_EXCHANGE_DATA, ACTION_INJECT_CONTROLLER, ACTION_RESET_AIRCRAFT,
    ACTION_RESTORE_CONTROLLER, body_byte_len, encode_exchange, encode_inject, encode_reset,
    encode_restore,
};
pub use reply::decode_reply;
