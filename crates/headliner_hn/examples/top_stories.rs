// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Prints the current Hacker News top stories, twice.
//!
//! The second read is answered from the cache without touching the network.
//!
//! ```text
//! cargo run -p headliner_hn --example top_stories
//! ```

use std::time::Duration;

use anyspawn::Spawner;
use headliner::{Coordinator, DisplayItem, Options};
use headliner_hn::HnClient;
use tick::Clock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let clock = Clock::new_tokio();
    let options = Options::default().required_count(30).workers(40).race_timeout(Duration::from_secs(5));
    let headlines = Coordinator::start(HnClient::hacker_news()?, &options, clock.clone(), Spawner::new_tokio());

    let stopwatch = clock.stopwatch();
    let stories = headlines.current().await?;
    println!("{} stories in {:?}\n", stories.len(), stopwatch.elapsed());
    for (rank, story) in stories.iter().enumerate() {
        print_story(rank + 1, story);
    }

    let stopwatch = clock.stopwatch();
    let cached = headlines.current().await?;
    println!("\n{} stories from cache in {:?}", cached.len(), stopwatch.elapsed());

    Ok(())
}

fn print_story(rank: usize, story: &DisplayItem) {
    println!(
        "{rank:>3}. {} ({})\n     {} points by {} | {} comments",
        story.title.as_deref().unwrap_or("untitled"),
        story.host,
        story.score.unwrap_or_default(),
        story.by.as_deref().unwrap_or("unknown"),
        story.descendants.unwrap_or_default(),
    );
}
