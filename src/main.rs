use tracing_subscriber::EnvFilter;

use pillseek::config::AppConfig;
use pillseek::error::ApiError;
use pillseek::models::candidate::AnalysisOutcome;
use pillseek::services::api::{ApiClient, CapturedImage};
use pillseek::services::poller::JobPoller;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    let Some(image_path) = std::env::args().nth(1) else {
        eprintln!("usage: pillseek <image-path>");
        std::process::exit(2);
    };

    let client = ApiClient::new(&config).expect("Failed to initialize API client");

    match identify(&client, &image_path).await {
        Ok(outcome) if outcome.is_empty() => {
            println!("Analysis finished, but no matching pills were found.");
        }
        Ok(outcome) => print_groups(&outcome),
        Err(err) => {
            tracing::error!(error = %err, "identification failed");
            if err.is_input() {
                eprintln!("{err} (nothing was uploaded)");
            } else {
                eprintln!("{err}");
            }
            std::process::exit(1);
        }
    }
}

/// The photo path: upload, poll to a terminal state, fetch grouped results.
async fn identify(client: &ApiClient, image_path: &str) -> Result<AnalysisOutcome, ApiError> {
    let image = CapturedImage::from_path(image_path);
    let mut job = client.submit_image(&image).await?;

    let poller = JobPoller::new(client.clone());
    poller.wait_for_result(&mut job).await?;

    client.fetch_analysis(&job.task_id).await
}

fn print_groups(outcome: &AnalysisOutcome) {
    println!("Found {} pill(s) in the image.", outcome.groups.len());
    for (index, group) in outcome.groups.iter().enumerate() {
        match group.representative() {
            Some(top) => println!(
                "  pill {}: {} ({} candidate(s))",
                index + 1,
                top.name,
                group.len()
            ),
            None => println!("  pill {}: no candidates", index + 1),
        }
    }
}
