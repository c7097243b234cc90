use crate::api::validation::validate_search_query;
use crate::config::Config;
use crate::models::{LocationRecord, MeetupEntry, WeatherEntry};
use crate::state::SharedState;

pub async fn cmd_lookup(config: &Config, words: &[String], json: bool) -> anyhow::Result<()> {
    let query = lookup_query(words)?;

    let state = SharedState::new(config.clone()).await?;
    let service = &state.lookup_service;

    let location = service.resolve_location(&query).await?;
    let weather = service.resolve_weather(location.id).await?;

    // An area without upcoming events is not an error for the CLI.
    let meetups = match service.resolve_meetups(location.id).await {
        Ok(meetups) => meetups,
        Err(e) => {
            tracing::warn!("Meetup lookup failed: {}", e);
            Vec::new()
        }
    };

    if json {
        let output = serde_json::json!({
            "location": location,
            "weather": weather,
            "meetups": meetups,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&location, &weather, &meetups);
    }

    Ok(())
}

/// Joins the CLI words into the same cache key the HTTP endpoint would use.
fn lookup_query(words: &[String]) -> anyhow::Result<String> {
    let joined = words.join(" ");
    let query = validate_search_query(&joined)?;
    Ok(query.to_string())
}

fn print_summary(location: &LocationRecord, weather: &[WeatherEntry], meetups: &[MeetupEntry]) {
    println!();
    println!("📍 {} (#{})", location.formatted_query, location.id);
    println!(
        "   Coordinates: {:.4}, {:.4}",
        location.latitude, location.longitude
    );

    println!();
    println!("Forecast:");
    println!("{:-<60}", "");
    for day in weather {
        println!("• {}: {}", day.time, day.forecast);
    }

    println!();
    println!("Meetups:");
    println!("{:-<60}", "");
    if meetups.is_empty() {
        println!("No upcoming meetups found");
    }
    for meetup in meetups {
        println!("• {} (created {})", meetup.name, meetup.creation_date);
        println!("  Host: {} | {}", meetup.host, meetup.link);
    }
}
