mod config;
mod error;
mod links;
mod parser;
mod pipeline;
mod references;
mod scraper;
mod table;

use std::path::PathBuf;
use std::time::Instant;

use clap::{ArgAction, Parser};

use config::{DelayBounds, RunConfig};
use scraper::{HttpFetcher, RandomPacer};

#[derive(Parser)]
#[command(
    name = "legislator_scraper",
    about = "Scrape Mississippi Legislature member bios linked from a roster PDF"
)]
struct Cli {
    /// PDF file containing the links to scrape (path segments are joined)
    #[arg(short, long, num_args = 1.., required = true)]
    input: Vec<String>,

    /// Output CSV file (path segments are joined)
    #[arg(short, long, num_args = 1.., required = true)]
    output: Vec<String>,

    /// Save the filtered url list
    #[arg(
        short,
        long,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    save_list: bool,

    /// Where the url list goes
    #[arg(long, default_value = config::LINKS_FILE)]
    links_file: PathBuf,

    /// Output field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Shortest pause after a fetch, in seconds
    #[arg(long, default_value_t = config::MIN_DELAY_SECS)]
    min_delay: u64,

    /// Longest pause after a fetch, in seconds
    #[arg(long, default_value_t = config::MAX_DELAY_SECS)]
    max_delay: u64,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<RunConfig> {
        Ok(RunConfig {
            input: config::join_segments(&self.input),
            output: config::join_segments(&self.output),
            save_list: self.save_list,
            links_path: self.links_file,
            delimiter: config::delimiter_byte(self.delimiter)?,
            delay: DelayBounds::from_secs(self.min_delay, self.max_delay)?,
            show_progress: !self.no_progress,
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let config = Cli::parse().into_config()?;

    let fetcher = HttpFetcher::new(config::USER_AGENT)?;
    let mut pacer = RandomPacer::new(config.delay);
    let output = config.output.clone();

    let stats = pipeline::run(config, &fetcher, &mut pacer).await?;
    println!(
        "Done: {} pages ({} ok, {} NA) -> {}",
        stats.total,
        stats.ok,
        stats.na(),
        output.display()
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("Finished in {}", format_duration(elapsed));
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["legislator_scraper", "-i", "data", "roster.pdf", "-o", "bios.csv"]).unwrap();
        let config = cli.into_config().unwrap();
        assert_eq!(config.input, PathBuf::from("data").join("roster.pdf"));
        assert_eq!(config.output, PathBuf::from("bios.csv"));
        assert!(config.save_list);
        assert_eq!(config.links_path, PathBuf::from("links.txt"));
        assert_eq!(config.delimiter, b',');
        assert_eq!(config.delay, DelayBounds::default());
        assert!(config.show_progress);
    }

    #[test]
    fn save_list_flag_values() {
        let parse = |extra: &[&str]| {
            let mut args = vec!["legislator_scraper", "-i", "r.pdf", "-o", "b.csv"];
            args.extend_from_slice(extra);
            Cli::try_parse_from(args).unwrap().save_list
        };
        assert!(parse(&["-s"]));
        assert!(!parse(&["-s", "false"]));
        assert!(!parse(&["--save-list=false"]));
    }

    #[test]
    fn input_and_output_required() {
        assert!(Cli::try_parse_from(["legislator_scraper", "-o", "b.csv"]).is_err());
        assert!(Cli::try_parse_from(["legislator_scraper", "-i", "r.pdf"]).is_err());
    }

    #[test]
    fn inverted_delays_rejected() {
        let cli = Cli::try_parse_from([
            "legislator_scraper", "-i", "r.pdf", "-o", "b.csv", "--min-delay", "9", "--max-delay", "2",
        ])
        .unwrap();
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn durations_format() {
        assert_eq!(format_duration(std::time::Duration::from_secs(75)), "1m 15s");
        assert_eq!(format_duration(std::time::Duration::from_secs(3725)), "1h 2m 5s");
    }
}
