//! Core types for the simulator exchange.
//!
//! - [`TelemetryValue`] is the closed tagged union every reply field is
//!   coerced into at decode time (never lazily at read time).
//! - [`ControlInputs`] is the 12-channel normalized control vector sent on
//!   every exchange cycle.
//!
//! Both carry serde derives so downstream tooling can snapshot them.

mod controls;
mod value;

pub use controls::{CHANNEL_COUNT, ControlInputs};
pub use value::{TelemetryValue, ValueKind};

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_plain_decimals_always_coerce_to_float(value in -1.0e6f64..1.0e6f64) {
            // Any fixed-point rendering the encoder can emit must coerce back
            // to a float, within the 4-decimal formatting tolerance.
            let rendered = format!("{value:.4}");
            let coerced = TelemetryValue::coerce("field", &rendered).unwrap();
            match coerced {
                TelemetryValue::Float(parsed) => prop_assert!((parsed - value).abs() < 1e-4),
                other => prop_assert!(false, "expected float, got {other:?}"),
            }
        }

        #[test]
        fn prop_coercion_never_panics(raw in ".*") {
            // Arbitrary reply text either coerces or reports a coercion error.
            let _ = TelemetryValue::coerce("field", &raw);
        }

        #[test]
        fn prop_non_numeric_text_round_trips(raw in "[a-zA-Z][a-zA-Z ]*") {
            let coerced = TelemetryValue::coerce("field", &raw).unwrap();
            if raw == "true" || raw == "false" {
                prop_assert_eq!(coerced.kind(), ValueKind::Bool);
            } else {
                prop_assert_eq!(coerced.as_str(), Some(raw.as_str()));
            }
        }

        #[test]
        fn prop_control_inputs_round_trip(values in prop::array::uniform12(0.0f64..=1.0f64)) {
            let inputs = ControlInputs::from(values);
            prop_assert_eq!(inputs.as_slice(), &values[..]);
            prop_assert_eq!(ControlInputs::from_slice(&values).unwrap(), inputs);
        }
    }
}
