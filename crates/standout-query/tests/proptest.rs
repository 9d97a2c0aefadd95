//! Property-based tests for query pipelines using proptest.

use std::cell::Cell;

use proptest::prelude::*;
use standout_query::{Query, QueryError, Value};

// ============================================================================
// Test helpers
// ============================================================================

fn keyed<'a>(items: &[(u32, i64)]) -> Query<'a, u32, i64> {
    Query::from_entries(items.to_vec())
}

// Strategy for keyed sequences with distinct keys, in arbitrary order.
fn distinct_entries() -> impl Strategy<Value = Vec<(u32, i64)>> {
    prop::collection::hash_map(any::<u32>(), any::<i64>(), 0..50)
        .prop_map(|map| map.into_iter().collect::<Vec<_>>())
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Building a chain never invokes a callback.
    #[test]
    fn chains_are_lazy(
        items in prop::collection::vec(any::<i64>(), 0..50),
        depth in 1usize..6,
    ) {
        let calls = Cell::new(0);
        let len = items.len();
        let mut query = Query::from(items);
        for _ in 0..depth {
            query = query
                .map(|v, _| {
                    calls.set(calls.get() + 1);
                    v
                })
                .filter(|_, _| {
                    calls.set(calls.get() + 1);
                    true
                });
        }
        prop_assert_eq!(calls.get(), 0);

        prop_assert_eq!(query.count(), Ok(len));
        prop_assert_eq!(calls.get(), 2 * depth * len);
    }

    /// Filtering keeps the source's relative order and its keys.
    #[test]
    fn filter_preserves_order(
        items in distinct_entries(),
        threshold in any::<i64>(),
    ) {
        let expected: Vec<(u32, i64)> = items
            .iter()
            .copied()
            .filter(|(_, v)| *v > threshold)
            .collect();

        let list = keyed(&items)
            .filter(move |v, _| *v > threshold)
            .to_list()
            .unwrap();
        let actual: Vec<(u32, i64)> = list.into_iter().collect();

        prop_assert_eq!(actual, expected);
    }

    /// Mapping keeps the source's keys in order.
    #[test]
    fn map_preserves_keys(items in distinct_entries()) {
        let keys: Vec<u32> = items.iter().map(|(k, _)| *k).collect();
        let list = keyed(&items).map(|v, _| v.wrapping_mul(2)).to_list().unwrap();
        prop_assert_eq!(list.keys().copied().collect::<Vec<_>>(), keys);
    }

    /// A map collapsing every key to one value fails on the second element.
    #[test]
    fn collapsing_keys_fail_on_second_element(
        items in prop::collection::vec(any::<i64>(), 2..50),
    ) {
        let result = Query::from(items).map(|v, k| {
            *k = 0;
            v
        }).to_list();

        prop_assert_eq!(
            result,
            Err(QueryError::KeyDuplicate { key: "0".to_string(), position: 1 })
        );
    }

    /// A non-bool predicate result is rejected at whichever position it occurs.
    #[test]
    fn predicate_strictness_at_every_position(
        len in 1usize..40,
        bad in any::<prop::sample::Index>(),
    ) {
        let bad = bad.index(len);
        let result = Query::from_values(0..len)
            .filter(move |v, _| {
                if *v == bad { Value::from(*v) } else { Value::Bool(true) }
            })
            .to_vec();

        prop_assert_eq!(
            result,
            Err(QueryError::PredicateType {
                actual: "number",
                key: bad.to_string(),
                position: bad,
            })
        );
    }

    /// count_where agrees with materializing and filtering by hand.
    #[test]
    fn count_matches_to_list(
        items in prop::collection::vec(any::<i64>(), 0..100),
        threshold in any::<i64>(),
    ) {
        let query = Query::from(items);
        let by_hand = query
            .to_list()
            .unwrap()
            .values()
            .filter(|v| **v >= threshold)
            .count();

        prop_assert_eq!(query.count_where(|v, _| *v >= threshold), Ok(by_hand));
    }

    /// any_where is true exactly when count_where is positive.
    #[test]
    fn any_agrees_with_count(
        items in prop::collection::vec(any::<i64>(), 0..100),
        threshold in any::<i64>(),
    ) {
        let query = Query::from(items);
        let count = query.count_where(|v, _| *v < threshold).unwrap();
        prop_assert_eq!(query.any_where(|v, _| *v < threshold), Ok(count > 0));
        prop_assert_eq!(query.any(), Ok(query.count().unwrap() > 0));
    }

    /// first_where and last_where bracket every match.
    #[test]
    fn first_and_last_bracket_matches(
        items in prop::collection::vec(-100i64..100, 0..60),
        threshold in -100i64..100,
    ) {
        let query = Query::from(items.clone());
        let matches: Vec<i64> = items.into_iter().filter(|v| *v > threshold).collect();

        prop_assert_eq!(
            query.first_or_default_where(|v, _| *v > threshold),
            Ok(matches.first().copied())
        );
        prop_assert_eq!(
            query.last_or_default_where(|v, _| *v > threshold),
            Ok(matches.last().copied())
        );
    }

    /// single succeeds exactly when one element matches.
    #[test]
    fn single_cardinality(
        items in prop::collection::vec(0i64..5, 0..20),
        target in 0i64..5,
    ) {
        let query = Query::from(items.clone());
        let hits = items.iter().filter(|v| **v == target).count();
        let result = query.single_or_default(|v, _| *v == target);

        match hits {
            0 => prop_assert_eq!(result, Ok(None)),
            1 => prop_assert_eq!(result, Ok(Some(target))),
            count => prop_assert_eq!(result, Err(QueryError::TooManyValues { count })),
        }
    }

    /// Re-evaluating a re-iterable query gives identical results.
    #[test]
    fn evaluation_is_repeatable(items in distinct_entries()) {
        let query = keyed(&items).filter(|v, _| *v % 3 != 0).map(|v, _| v / 3);
        let first: Vec<_> = query.to_list().unwrap().into_iter().collect();
        let second: Vec<_> = query.to_list().unwrap().into_iter().collect();
        prop_assert_eq!(first, second);
    }
}
