//! Inbound reply decoding.
//!
//! The simulator answers every `ExchangeData` request with a SOAP document
//! whose body's first child carries three groups in fixed order:
//!
//! 1. previous-inputs group, whose `m-channelValues-0to1` block lists the
//!    receiver channels positionally as `<item>` elements;
//! 2. aircraft-state group, one element per telemetry tag;
//! 3. notifications group, same shape as the aircraft-state group.
//!
//! Decoding stages a `(tag, value)` batch; nothing is written to the
//! telemetry store here, so a failure anywhere leaves the store untouched.

use crate::state;
use crate::types::TelemetryValue;
use crate::{LinkError, Result};

/// Tag of the positional receiver-channel block inside the first group.
const CHANNEL_BLOCK_TAG: &str = "m-channelValues-0to1";

/// Decode a raw reply buffer into a batch of telemetry updates.
///
/// The buffer is split on line feeds and the last two segments are rejoined
/// first: the transport's framing can leave the closing tags on a final
/// partial line. Tags outside the fixed vocabulary are dropped here; a
/// field that looks numeric but fails to parse aborts the whole batch.
pub fn decode_reply(raw: &str) -> Result<Vec<(String, TelemetryValue)>> {
    let xml = rejoin_tail(raw);
    let doc = roxmltree::Document::parse(&xml)
        .map_err(|e| LinkError::malformed_reply("reply XML", e.to_string()))?;

    let body = doc
        .root_element()
        .first_element_child()
        .ok_or_else(|| LinkError::malformed_reply("reply structure", "envelope has no body"))?;
    let payload = body
        .first_element_child()
        .ok_or_else(|| LinkError::malformed_reply("reply structure", "body has no payload"))?;

    let groups: Vec<_> = payload.children().filter(|n| n.is_element()).collect();
    if groups.len() < 3 {
        return Err(LinkError::malformed_reply(
            "reply structure",
            format!("expected 3 payload groups, found {}", groups.len()),
        ));
    }

    let mut updates = Vec::with_capacity(48);

    // Group 0: the channel block maps <item> elements positionally onto
    // rcin0..; other tags inside the block do not advance the index.
    for block in groups[0].children().filter(|n| n.is_element()) {
        if block.tag_name().name() != CHANNEL_BLOCK_TAG {
            continue;
        }
        let mut index = 0usize;
        for item in block.children().filter(|n| n.is_element()) {
            if item.tag_name().name() != "item" {
                continue;
            }
            let tag = format!("rcin{index}");
            index += 1;
            if state::is_known_tag(&tag) {
                let value = TelemetryValue::coerce(&tag, item.text().unwrap_or(""))?;
                updates.push((tag, value));
            }
        }
    }

    // Groups 1 and 2: direct tag lookups against the vocabulary.
    for group in &groups[1..3] {
        for field in group.children().filter(|n| n.is_element()) {
            let tag = field.tag_name().name();
            if state::is_known_tag(tag) {
                let value = TelemetryValue::coerce(tag, field.text().unwrap_or(""))?;
                updates.push((tag.to_owned(), value));
            }
        }
    }

    Ok(updates)
}

/// Rejoin the last two line-feed-separated segments of the buffer.
fn rejoin_tail(raw: &str) -> String {
    let mut segments: Vec<&str> = raw.split('\n').collect();
    if segments.len() > 2 {
        segments.drain(..segments.len() - 2);
    }
    // A stray CR from the framing would land ahead of the XML declaration.
    segments.concat().trim_start().to_string()
}
