//! Property tests for the suggestion threshold

mod common;

use proptest::prelude::*;
use std::sync::Arc;

use common::FakeGeocoder;
use coverage_checker::suggest::{SuggestionFetcher, SuggestionOutcome};

proptest! {
    #[test]
    fn short_queries_never_reach_geocoder(
        core in "[a-zA-Z0-9 ]{0,2}",
        pad_left in " {0,4}",
        pad_right in "[ \t]{0,4}",
    ) {
        let query = format!("{pad_left}{}{pad_right}", core.trim());
        let geocoder = Arc::new(FakeGeocoder::thika());
        let fetcher = SuggestionFetcher::new(geocoder.clone(), 3, 5);

        let outcome = tokio_test::block_on(fetcher.fetch(&query)).unwrap();

        prop_assert_eq!(outcome, SuggestionOutcome::TooShort);
        prop_assert_eq!(geocoder.calls(), 0);
    }

    #[test]
    fn long_queries_issue_exactly_one_request(query in "[a-zA-Z]{3,12}( [a-zA-Z]{1,8})?") {
        let geocoder = Arc::new(FakeGeocoder::thika());
        let fetcher = SuggestionFetcher::new(geocoder.clone(), 3, 5);

        let outcome = tokio_test::block_on(fetcher.fetch(&query)).unwrap();

        prop_assert!(matches!(outcome, SuggestionOutcome::Found(_)));
        prop_assert_eq!(geocoder.queries(), vec![query]);
    }
}
