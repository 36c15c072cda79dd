use anyhow::{Context, Result};
use std::sync::Arc;

use coverage_checker::config::Config;
use coverage_checker::geocoder::NominatimClient;
use coverage_checker::suggest::{SuggestionFetcher, SuggestionOutcome};
use coverage_checker::utils::truncate_text;
use coverage_checker::view::NO_SUGGESTIONS_TEXT;

pub async fn suggest(config: Config, query: String) -> Result<()> {
    let geocoder = NominatimClient::new(&config.geocoder).context("Failed to create geocoder")?;
    let fetcher = SuggestionFetcher::new(
        Arc::new(geocoder),
        config.geocoder.min_query_chars,
        config.geocoder.suggestion_limit,
    );

    let outcome = fetcher
        .fetch(&query)
        .await
        .context("Suggestion lookup failed")?;

    match outcome {
        SuggestionOutcome::TooShort => {
            println!(
                "Type at least {} characters to get suggestions.",
                config.geocoder.min_query_chars
            );
        }
        SuggestionOutcome::Found(items) if items.is_empty() => {
            println!("{NO_SUGGESTIONS_TEXT}");
        }
        SuggestionOutcome::Found(items) => {
            println!("Suggestions for \"{}\":\n", query.trim());
            for (i, item) in items.iter().enumerate() {
                println!("{}. {}", i + 1, truncate_text(&item.display_name, 80));
                println!("   ({:.5}, {:.5})", item.lat, item.lon);
            }
        }
    }

    Ok(())
}
