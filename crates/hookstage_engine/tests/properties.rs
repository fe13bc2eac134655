//! Property tests for requirement gating and the active set.
//!
//! Requirements are generated over four types, of which only the first three
//! have a registered predicate. Each predicate accepts a random set of values.
//! The properties check that activation is exactly the conjunction of the
//! declared requirements and that disable always empties the active set.

mod common;

use core::sync::atomic::Ordering;

use common::{probe, source};
use hookstage_engine::prelude::*;

const KINDS: [&str; 4] = ["plugin", "config", "world", "unregistered"];

fn registry(accepted: &[String]) -> RequirementRegistry {
    let mut registry = RequirementRegistry::new();
    for kind in &KINDS[..3] {
        let accepted = accepted.to_vec();
        registry.register(*kind, move |value| accepted.iter().any(|a| a == value));
    }
    registry
}

fn expected_failure(reqs: &[(usize, String)], accepted: &[String]) -> Option<usize> {
    reqs.iter()
        .position(|(kind, value)| *kind == 3 || !accepted.contains(value))
}

mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_requirements() -> impl Strategy<Value = Vec<(usize, String)>> {
        prop::collection::vec((0..KINDS.len(), "[a-d]{1,2}"), 0..6)
    }

    fn arb_accepted() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-d]{1,2}", 0..8)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Evaluation passes iff every requirement passes, and reports the
        /// first failing one otherwise.
        #[test]
        fn prop_evaluation_is_ordered_conjunction(
            reqs in arb_requirements(),
            accepted in arb_accepted(),
        ) {
            let registry = registry(&accepted);
            let requirements: Vec<Requirement> = reqs
                .iter()
                .map(|(kind, value)| Requirement::new(KINDS[*kind], value.clone()))
                .collect();

            match (registry.evaluate(&requirements), expected_failure(&reqs, &accepted)) {
                (Ok(()), None) => {}
                (Err(failed), Some(index)) => prop_assert_eq!(failed, &requirements[index]),
                (actual, expected) => {
                    prop_assert!(false, "evaluate returned {:?}, expected failure at {:?}", actual, expected);
                }
            }
        }

        /// A hook is constructed and activated iff all its requirements hold.
        #[test]
        fn prop_failing_hooks_are_never_constructed(
            reqs in arb_requirements(),
            accepted in arb_accepted(),
        ) {
            let (builder, state) = probe("gated", Phase::Load);
            let descriptor = reqs
                .iter()
                .fold(builder, |builder, (kind, value)| {
                    builder.require(Requirement::new(KINDS[*kind], value.clone()))
                })
                .build()
                .unwrap();
            let key = descriptor.key();

            let hooker = Hooker::register(&source([descriptor]), HookerOptions::new()).unwrap();
            for kind in &KINDS[..3] {
                let accepted = accepted.clone();
                hooker
                    .requirement(*kind, move |value| accepted.iter().any(|a| a == value))
                    .unwrap();
            }

            let passes = expected_failure(&reqs, &accepted).is_none();
            prop_assert_eq!(hooker.load().unwrap(), usize::from(passes));
            prop_assert_eq!(state.created.load(Ordering::SeqCst), usize::from(passes));
            prop_assert_eq!(hooker.is_active(key), passes);
        }

        /// Disable empties the active set no matter which stops fail.
        #[test]
        fn prop_disable_always_empties(failing_stops in prop::collection::vec(any::<bool>(), 0..8)) {
            let mut descriptors = Vec::new();
            let mut states = Vec::new();
            for fails in &failing_stops {
                let (builder, state) = probe("member", Phase::Load);
                state.fail_stop.store(*fails, Ordering::SeqCst);
                descriptors.push(builder.build().unwrap());
                states.push(state);
            }

            let hooker = Hooker::register(&source(descriptors), HookerOptions::new()).unwrap();
            prop_assert_eq!(hooker.load().unwrap(), failing_stops.len());

            let result = hooker.disable();
            prop_assert_eq!(result.is_err(), failing_stops.iter().any(|fails| *fails));
            prop_assert_eq!(hooker.active_count(), 0);
            prop_assert!(states.iter().all(|state| state.stopped() == 1));
        }
    }
}
