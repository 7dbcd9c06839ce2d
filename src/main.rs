use anyhow::{Context, bail};
use clap::Parser;
use exam_search::cli::Cli;
use exam_search::report::ResultsView;
use exam_search::{PreparedDataset, SearchEngine, SearchState, logging};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

/// How often the elapsed time of a running search is reported.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the results.
    logging::init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    let text = tokio::fs::read_to_string(&cli.dataset)
        .await
        .with_context(|| format!("Failed to read dataset {}", cli.dataset.display()))?;
    let dataset = PreparedDataset::from_json_str(&text, &config.dataset)
        .with_context(|| format!("Failed to prepare dataset {}", cli.dataset.display()))?;

    let engine = SearchEngine::new(Arc::new(dataset), &config);
    let handle = engine.start_search(&cli.query)?;

    let mut progress = interval(PROGRESS_INTERVAL);
    progress.set_missed_tick_behavior(MissedTickBehavior::Skip);
    progress.tick().await;

    let finished = engine.wait(handle);
    tokio::pin!(finished);
    let status = loop {
        tokio::select! {
            status = &mut finished => break status,
            _ = progress.tick() => {
                tracing::info!("Searching... {} ms", engine.status(handle).elapsed_ms);
            }
        }
    };

    match status.state {
        SearchState::Completed => {
            let view = ResultsView::new(&status, config.display.page_size, cli.page)
                .context("Completed search returned no results")?;
            if cli.json {
                println!("{}", view.to_json()?);
            } else {
                print!("{}", view.to_text());
            }
            Ok(())
        }
        SearchState::Failed => bail!(
            "Search failed: {}",
            status.fault.as_deref().unwrap_or("unknown fault")
        ),
        state => bail!("Search ended in state {}", state),
    }
}
