//! Integration tests for orderlens-common.

use orderlens_common::{parse_timestamp, MonthBucket, OrderLensError, StateCode, STATE_NAMES};
use proptest::prelude::*;

#[test]
fn test_every_known_state_has_a_display_name() {
    for (code, name) in STATE_NAMES {
        let state = StateCode::new(code.to_ascii_lowercase());
        assert_eq!(state.display_name(), name);
    }
}

#[test]
fn test_malformed_timestamp_is_an_input_error() {
    let err = parse_timestamp("31/12/2017").unwrap_err();
    assert!(matches!(err, OrderLensError::Input { .. }));
    assert!(err.is_fatal());
}

proptest! {
    #[test]
    fn prop_month_range_is_contiguous_and_sorted(
        y1 in 2000i32..2030, m1 in 1u32..=12, span in 0usize..60
    ) {
        let start = MonthBucket::new(y1, m1).unwrap();
        let mut end = start;
        for _ in 0..span {
            end = end.next();
        }
        let range = MonthBucket::range_inclusive(start, end);
        prop_assert_eq!(range.len(), span + 1);
        for pair in range.windows(2) {
            prop_assert!(pair[0] < pair[1]);
            prop_assert!(pair[0].to_string() < pair[1].to_string());
            prop_assert_eq!(pair[0].next(), pair[1]);
        }
    }

    #[test]
    fn prop_month_display_parses_back(y in 0i32..=9999, m in 1u32..=12) {
        let month = MonthBucket::new(y, m).unwrap();
        prop_assert_eq!(month.to_string().parse::<MonthBucket>().unwrap(), month);
    }
}
