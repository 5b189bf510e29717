//! Error types for the FlightAxis Link bridge.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context. The taxonomy follows the protocol's propagation policy:
//!
//! - **Transport / Config errors** surface when the bridge is being wired up
//!   (bad endpoint, unreadable config). Transport errors are retryable.
//! - **MalformedReply / Coercion errors** surface once per failed exchange;
//!   the telemetry store is left untouched for that cycle.
//! - **ControlVectorLength / UnknownTag** are precondition violations by the
//!   caller and fail loudly before any I/O happens.
//!
//! Reply timeouts and empty replies are *not* errors: the exchange layer
//! absorbs them as skipped frames and never raises them to the caller.
//!
//! ```rust
//! use flightlink::LinkError;
//!
//! let error = LinkError::transport_failed("simulator not reachable");
//! if error.is_retryable() {
//!     println!("Can retry this operation");
//! }
//! ```

use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T, E = LinkError> = std::result::Result<T, E>;

/// Main error type for FlightAxis Link operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LinkError {
    #[error("Transport failure: {reason}")]
    Transport {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Malformed simulator reply in {context}: {details}")]
    MalformedReply { context: String, details: String },

    #[error("Field '{tag}' looks numeric but failed to parse: {raw:?}")]
    Coercion { tag: String, raw: String },

    #[error("Control vector must have exactly 12 channels, got {len}")]
    ControlVectorLength { len: usize },

    #[error("Telemetry tag '{tag}' is not part of the simulator vocabulary")]
    UnknownTag { tag: String },

    #[error("Type conversion error: {details}")]
    TypeConversion { details: String },

    #[error("Configuration error: {details}")]
    Config {
        details: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LinkError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            LinkError::Transport { .. } => true,
            LinkError::MalformedReply { .. } => false,
            LinkError::Coercion { .. } => false,
            LinkError::ControlVectorLength { .. } => false,
            LinkError::UnknownTag { .. } => false,
            LinkError::TypeConversion { .. } => false,
            LinkError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LinkError::Transport { .. } => vec![
                "Ensure RealFlight is running with FlightAxis Link enabled",
                "Check the configured host and port",
                "Verify the simulator machine is reachable on the network",
            ],
            LinkError::MalformedReply { .. } => vec![
                "Check the simulator version supports the SOAP dialect",
                "Capture the raw reply and inspect its structure",
            ],
            LinkError::Coercion { .. } => vec![
                "Capture the raw reply and inspect the offending field",
                "Report the field text to the simulator vendor",
            ],
            LinkError::ControlVectorLength { .. } => {
                vec!["Supply exactly 12 normalized channel values"]
            }
            LinkError::UnknownTag { .. } => vec![
                "Check the tag name spelling",
                "Use one of the tags from the fixed telemetry vocabulary",
            ],
            LinkError::TypeConversion { .. } => vec![
                "Check the expected kind for this telemetry tag",
                "Use the accessor matching the tag's declared kind",
            ],
            LinkError::Config { .. } => vec![
                "Check the bridge configuration file syntax",
                "Verify host, port and timeout values",
            ],
        }
    }

    /// Helper constructor for transport errors.
    pub fn transport_failed(reason: impl Into<String>) -> Self {
        LinkError::Transport { reason: reason.into(), source: None }
    }

    /// Helper constructor for transport errors with source.
    pub fn transport_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        LinkError::Transport { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for malformed-reply errors.
    pub fn malformed_reply(context: impl Into<String>, details: impl Into<String>) -> Self {
        LinkError::MalformedReply { context: context.into(), details: details.into() }
    }

    /// Helper constructor for coercion failures.
    pub fn coercion(tag: impl Into<String>, raw: impl Into<String>) -> Self {
        LinkError::Coercion { tag: tag.into(), raw: raw.into() }
    }

    /// Helper constructor for unknown-tag reads.
    pub fn unknown_tag(tag: impl Into<String>) -> Self {
        LinkError::UnknownTag { tag: tag.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config(details: impl Into<String>) -> Self {
        LinkError::Config { details: details.into(), source: None }
    }
}

impl From<serde_yaml_ng::Error> for LinkError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        LinkError::Config { details: "YAML parse failure".to_string(), source: Some(Box::new(err)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn error_messages_contain_their_context(
                reason in ".*",
                tag in "[a-zA-Z][a-zA-Z0-9-]*",
                raw in ".*",
                len in 0usize..64usize
            ) {
                let transport = LinkError::transport_failed(reason.clone());
                prop_assert!(transport.to_string().contains(&reason));

                let coercion = LinkError::coercion(tag.clone(), raw.clone());
                prop_assert!(coercion.to_string().contains(&tag));

                let unknown = LinkError::unknown_tag(tag.clone());
                prop_assert!(unknown.to_string().contains(&tag));

                let length = LinkError::ControlVectorLength { len };
                prop_assert!(length.to_string().contains(&len.to_string()));

                // No error message should be empty
                prop_assert!(!transport.to_string().is_empty());
                prop_assert!(!coercion.to_string().is_empty());
                prop_assert!(!unknown.to_string().is_empty());
                prop_assert!(!length.to_string().is_empty());
            }

            #[test]
            fn error_source_chaining_preserves_information(
                base_message in ".*",
                reason in ".*"
            ) {
                let base: Box<dyn std::error::Error + Send + Sync> =
                    Box::new(std::io::Error::other(base_message.clone()));
                let top = LinkError::transport_failed_with_source(reason, base);

                let source = std::error::Error::source(&top)
                    .expect("transport error should expose its source");
                prop_assert_eq!(source.to_string(), base_message);
            }
        }
    }

    #[test]
    fn retryability_classification() {
        assert!(LinkError::transport_failed("down").is_retryable());
        assert!(!LinkError::malformed_reply("reply parse", "truncated").is_retryable());
        assert!(!LinkError::coercion("m-airspeed-MPS", "1.2.3").is_retryable());
        assert!(!LinkError::ControlVectorLength { len: 7 }.is_retryable());
        assert!(!LinkError::unknown_tag("bogus").is_retryable());
        assert!(!LinkError::config("bad yaml").is_retryable());
    }

    #[test]
    fn recovery_suggestions_are_actionable() {
        let errors = [
            LinkError::transport_failed("down"),
            LinkError::malformed_reply("reply parse", "truncated"),
            LinkError::coercion("m-airspeed-MPS", "--1"),
            LinkError::ControlVectorLength { len: 0 },
            LinkError::unknown_tag("bogus"),
            LinkError::config("bad yaml"),
        ];
        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            for suggestion in suggestions {
                assert!(suggestion.len() > 5);
            }
        }
    }

    #[test]
    fn error_traits_validation() {
        // Compile-time check: LinkError must be Send + Sync + 'static
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<LinkError>();

        let error = LinkError::transport_failed("test");
        let _: &dyn std::error::Error = &error;
    }
}
