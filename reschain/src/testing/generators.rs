//! Property test generators for chain shapes and step names.
//!
//! Available behind the `testing` feature.

use proptest::prelude::*;

use crate::types::StepName;

/// The shape of one scripted chain run: how many steps, and where (if
/// anywhere) acquisition fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainShape {
    /// Total number of steps.
    pub total: usize,
    /// 1-based position of the failing step, if any.
    pub fail_at: Option<usize>,
}

/// Generates valid step names.
pub fn arb_step_name() -> impl Strategy<Value = StepName> {
    "[a-zA-Z0-9][a-zA-Z0-9._-]{0,254}"
        .prop_filter_map("Invalid StepName", |s| StepName::try_new(s).ok())
}

/// Generates diagnostic strings the way wrapped libraries produce them.
pub fn arb_diagnostic() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z ]{0,63}".prop_map(|s| s.trim_end().to_string())
}

/// Generates chain shapes with up to `max_steps` steps, roughly half of
/// which fail somewhere.
pub fn arb_chain_shape(max_steps: usize) -> impl Strategy<Value = ChainShape> {
    (0..=max_steps).prop_flat_map(|total| {
        let fail_at = if total == 0 {
            Just(None).boxed()
        } else {
            prop_oneof![Just(None), (1..=total).prop_map(Some)].boxed()
        };
        fail_at.prop_map(move |fail_at| ChainShape { total, fail_at })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_step_names_are_valid(name in arb_step_name()) {
            prop_assert!(!name.as_ref().is_empty());
            prop_assert!(name.as_ref().len() <= 255);
        }

        #[test]
        fn generated_shapes_fail_within_bounds(shape in arb_chain_shape(8)) {
            prop_assert!(shape.total <= 8);
            if let Some(k) = shape.fail_at {
                prop_assert!(k >= 1 && k <= shape.total);
            }
        }
    }
}
