use tracing_subscriber::EnvFilter;

use pillseek::config::AppConfig;
use pillseek::error::ApiError;
use pillseek::models::handoff::ResultHandoff;
use pillseek::models::query::SearchFilter;
use pillseek::services::api::ApiClient;
use pillseek::services::history::{MemoryRecent, RecentStore};
use pillseek::services::session::{ScrollOutcome, SearchSession, SessionPhase};

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

    // Free-text filter fields from the command line; the multi-select
    // dimensions stay unconstrained here.
    let mut filter = SearchFilter::new();
    filter.name = std::env::args().nth(1).unwrap_or_default();
    filter.company = std::env::args().nth(2).unwrap_or_default();

    let client = ApiClient::new(&config).expect("Failed to initialize API client");
    let handoff = ResultHandoff::Query(filter.build());

    if let Err(err) = run(&client, handoff).await {
        tracing::error!(error = %err, "search failed");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(client: &ApiClient, handoff: ResultHandoff) -> Result<(), ApiError> {
    let session = match handoff {
        ResultHandoff::Query(query) => SearchSession::new(client.clone(), query),
        ResultHandoff::Flat(items) => SearchSession::with_results(client.clone(), items),
        ResultHandoff::Grouped(_) => {
            eprintln!("grouped results need a selected group before listing");
            return Ok(());
        }
    };

    session.start().await?;

    // Read to the end, the way a user scrolling through every page would.
    while matches!(session.notify_scroll().await?, ScrollOutcome::Appended(_)) {}

    if session.phase() == SessionPhase::Empty {
        println!("No results for this search.");
        return Ok(());
    }

    let items = session.results();
    println!(
        "{} result(s) across {} page(s):",
        items.len(),
        session.total_pages()
    );
    for item in &items {
        println!("  [{}] {}", item.code, item.name);
    }

    if let Some(top) = items.first() {
        show_detail(client, &top.code).await?;

        // Session-local history, seeded from the server's recent list.
        let history = MemoryRecent::with_capacity(10);
        if let Ok(seeds) = client.fetch_recent().await {
            for seed in seeds.into_iter().rev() {
                history.record(seed).await?;
            }
        }
        history.record(top.clone()).await?;

        let recent = history.recent().await?;
        println!("Recent lookups:");
        for entry in recent {
            println!("  {}", entry.name);
        }
    }

    Ok(())
}

async fn show_detail(client: &ApiClient, code: &str) -> Result<(), ApiError> {
    let detail = client.fetch_detail(code).await?;
    if detail.name.is_empty() {
        println!("No detailed record for the top result.");
        return Ok(());
    }

    println!("Top result detail:");
    println!("  name:    {}", detail.name);
    println!("  company: {}", detail.company);
    println!("  effects: {}", detail.effects);
    println!("  usage:   {}", detail.usage);
    Ok(())
}
