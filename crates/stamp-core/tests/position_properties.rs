//! Property-based tests for anchor resolution
//!
//! Covers the documented anchor vocabulary plus arbitrary tokens, checking
//! the margin insets, centering and the purity of the resolver.

use proptest::prelude::*;
use stamp_core::{resolve_position, Anchor, PageGeometry, TextMetrics};

fn page() -> impl Strategy<Value = PageGeometry> {
    (100.0f64..2000.0, 100.0f64..2000.0).prop_map(|(width, height)| PageGeometry { width, height })
}

fn metrics() -> impl Strategy<Value = TextMetrics> {
    (0.0f64..500.0, 1.0f64..72.0).prop_map(|(width, size)| TextMetrics::new(width, size))
}

fn margin() -> impl Strategy<Value = f64> {
    0.0f64..100.0
}

fn known_anchor() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("top-left".to_string()),
        Just("top-center".to_string()),
        Just("top-right".to_string()),
        Just("bottom-left".to_string()),
        Just("bottom-center".to_string()),
        Just("bottom-right".to_string()),
        Just("center".to_string()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn bottom_right_insets_by_margin(page in page(), text in metrics(), m in margin()) {
        let pos = resolve_position(page, text, &Anchor::new("bottom-right"), m);
        prop_assert_eq!(pos.x, page.width - m - text.width);
        prop_assert_eq!(pos.y, m);
    }

    #[test]
    fn top_left_insets_by_margin(page in page(), text in metrics(), m in margin()) {
        let pos = resolve_position(page, text, &Anchor::new("top-left"), m);
        prop_assert_eq!(pos.x, m);
        prop_assert_eq!(pos.y, page.height - m - text.height);
    }

    #[test]
    fn center_tokens_center_horizontally(
        page in page(),
        text in metrics(),
        m in margin(),
        prefix in prop_oneof![Just(""), Just("top-"), Just("bottom-")],
    ) {
        let anchor = Anchor::new(format!("{}center", prefix));
        let pos = resolve_position(page, text, &anchor, m);
        prop_assert_eq!(pos.x, (page.width - text.width) / 2.0);
        if prefix == "bottom-" {
            prop_assert_eq!(pos.y, m);
        } else {
            prop_assert_eq!(pos.y, page.height - m - text.height);
        }
    }

    #[test]
    fn resolver_is_pure(
        page in page(),
        text in metrics(),
        m in margin(),
        anchor in known_anchor(),
    ) {
        let anchor = Anchor::new(anchor);
        let first = resolve_position(page, text, &anchor, m);
        let second = resolve_position(page, text, &anchor, m);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn arbitrary_tokens_never_panic_and_stay_finite(
        page in page(),
        text in metrics(),
        m in margin(),
        token in ".{0,30}",
    ) {
        let pos = resolve_position(page, text, &Anchor::new(token), m);
        prop_assert!(pos.x.is_finite());
        prop_assert!(pos.y.is_finite());
    }

    #[test]
    fn unqualified_tokens_resolve_top_aligned(
        page in page(),
        text in metrics(),
        m in margin(),
        token in "[a-z]{0,12}".prop_filter("no vertical prefix", |t| {
            !t.starts_with("top") && !t.starts_with("bottom")
        }),
    ) {
        let pos = resolve_position(page, text, &Anchor::new(token), m);
        prop_assert_eq!(pos.y, page.height - m - text.height);
    }
}
