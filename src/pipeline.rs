use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use crate::config::{RunConfig, DENYLIST};
use crate::links;
use crate::parser::Outcome;
use crate::references;
use crate::scraper::{Fetch, Pacer};
use crate::table::ResultTable;

/// Counts returned after the table is written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub ok: usize,
    pub structural: usize,
    pub failed: usize,
}

impl RunStats {
    pub fn na(&self) -> usize {
        self.structural + self.failed
    }
}

/// PDF → url list → (fetch → extract → append)* → delimited file.
pub async fn run<F: Fetch, P: Pacer>(
    config: RunConfig,
    fetcher: &F,
    pacer: &mut P,
) -> Result<RunStats> {
    let urls = references::extract_urls(&config.input)?;
    let urls = links::filter_denied(urls, &DENYLIST);
    if config.save_list {
        links::save_list(&urls, &config.links_path)?;
    }

    let (table, stats) = scrape_all(&urls, fetcher, pacer, config.show_progress).await;

    println!("Done.");
    table.write_csv(&config.output, config.delimiter)?;
    Ok(stats)
}

/// One row per url, in url order. Nothing here aborts the batch.
pub async fn scrape_all<F: Fetch, P: Pacer>(
    urls: &[String],
    fetcher: &F,
    pacer: &mut P,
    show_progress: bool,
) -> (ResultTable, RunStats) {
    let total = urls.len();
    let pb = if show_progress {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({msg})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut table = ResultTable::new();
    let mut stats = RunStats {
        total,
        ..Default::default()
    };

    for (i, url) in urls.iter().enumerate() {
        pb.suspend(|| println!("Scraping {} of {} urls", i + 1, total));

        let outcome = match fetcher.fetch(url).await {
            Ok(bytes) => Outcome::from_page(&bytes, url),
            Err(cause) => Outcome::OtherFailure {
                url: url.clone(),
                cause,
            },
        };

        match &outcome {
            Outcome::Success(record) => {
                stats.ok += 1;
                let row = serde_json::to_string(record).unwrap_or_default();
                pb.suspend(|| println!("Now appending: {}", row));
            }
            Outcome::StructuralAbsence { reason, .. } => {
                stats.structural += 1;
                pb.suspend(|| info!("{}", reason));
            }
            Outcome::OtherFailure { cause, .. } => {
                stats.failed += 1;
                pb.suspend(|| error!("Unexpected failure on {}: {:#}", url, cause));
            }
        }
        if !matches!(outcome, Outcome::Success(_)) {
            pb.suspend(|| println!("Failed to scrape {}. Filling row as NA.", outcome.url()));
        }
        table.push(outcome.into_record());
        pb.set_message(format!("{} NA", stats.na()));
        pb.inc(1);

        let delay = pacer.next_delay();
        pb.suspend(|| println!("Ok. Now sleeping for {} secs.", delay.as_secs()));
        pacer.wait(delay).await;
    }

    pb.finish_and_clear();
    info!(
        "Scraped {} pages ({} ok, {} NA)",
        stats.total,
        stats.ok,
        stats.na()
    );
    debug_assert_eq!(table.len(), total);
    (table, stats)
}
