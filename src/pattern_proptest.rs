//! Property-based tests for name patterns.
//!
//! These tests use proptest to generate random patterns and verify that
//! rendering invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::ids::next_id;
    use crate::pattern::{band, render, Namer};
    use crate::record::TalkGroup;
    use proptest::prelude::*;

    // ============================================================================
    // render property tests
    // ============================================================================

    proptest! {
        /// Property: text without `$` renders unchanged
        #[test]
        fn literal_text_is_unchanged(input in "[^$]*") {
            prop_assert_eq!(render(&input, None, None), input);
        }

        /// Property: rendering never panics and never grows placeholders into `$`
        #[test]
        fn rendered_text_has_no_dollar_without_context(input in ".*") {
            let out = render(&input, None, None);
            prop_assert!(!out.contains('$'), "'{}' rendered to '{}'", input, out);
        }

        /// Property: a length limit bounds the substituted value
        #[test]
        fn limit_bounds_value(name in "\\PC{0,40}", limit in 0usize..20) {
            let tg = TalkGroup::new(1, 1, name.clone());
            let out = render(&format!("$tg_name:{}", limit), None, Some(&tg));
            prop_assert!(out.chars().count() <= limit);
            prop_assert!(name.starts_with(&out));
        }

        /// Property: the namer never exceeds its cap
        #[test]
        fn namer_respects_cap(input in ".*", cap in 1usize..32) {
            let out = Namer::new(cap).name(&input, None, None);
            prop_assert!(out.chars().count() <= cap);
        }

        /// Property: band never panics and maps negative frequencies to UNK
        #[test]
        fn band_of_negative_is_unknown(freq in -1.0e6f64..0.0) {
            prop_assert_eq!(band(freq), "UNK");
        }
    }

    // ============================================================================
    // next_id property tests
    // ============================================================================

    proptest! {
        /// Property: the allocated ID is never already taken
        #[test]
        fn next_id_is_fresh(numbers in proptest::collection::vec(1u32..10_000, 0..30)) {
            let ids: Vec<String> = numbers.iter().map(|n| format!("ch{}", n)).collect();
            let next = next_id(ids.iter().map(String::as_str), "ch");
            prop_assert!(!ids.contains(&next));
            prop_assert!(next.starts_with("ch"));
        }
    }
}
