use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Result;
use clap::{ArgAction, Parser};
use console::style;
use scriptwright_core::{
    Config, GeminiClient, Pipeline, RunRequest, ScriptwrightError, SourceRegistry,
    format_result_readable, format_source_breakdown,
};
use tokio::fs;
use tracing_subscriber::EnvFilter;

use crate::progress::{SpinnerProgress, format_duration};

mod progress;

#[derive(Parser)]
#[command(name = "scriptwright")]
#[command(about = "Research a video topic and draft a long-form narration script")]
struct Cli {
    /// Video title to research and write for
    title: String,

    /// Keyword or competitor channel to research (repeatable). Defaults to the title.
    #[arg(short, long = "keyword", value_name = "KEYWORD")]
    keywords: Vec<String>,

    /// File with one keyword per line
    #[arg(long, value_name = "PATH")]
    keywords_file: Option<PathBuf>,

    /// Target video length in minutes
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(10..=60))]
    minutes: u32,

    /// Target word count. Defaults to minutes × 120.
    #[arg(long, value_parser = clap::value_parser!(u32).range(800..=7000))]
    words: Option<u32>,

    /// Only consider videos published in the last N days
    #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u32).range(1..=365))]
    days: u32,

    /// Top videos per keyword
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..=8))]
    videos: u32,

    /// Articles per keyword
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=8))]
    articles: u32,

    /// Skip fetching YouTube transcripts
    #[arg(long)]
    no_transcripts: bool,

    /// Gemini model name (overrides GEMINI_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Also write the script to this file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the full run result as JSON instead of markdown
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    async fn keywords_text(&self) -> Result<String> {
        let mut lines = self.keywords.clone();
        if let Some(path) = &self.keywords_file {
            lines.push(fs::read_to_string(path).await?);
        }
        Ok(lines.join("\n"))
    }

    async fn request(&self) -> Result<RunRequest> {
        Ok(RunRequest {
            title: self.title.clone(),
            keywords_text: self.keywords_text().await?,
            target_words: self
                .words
                .unwrap_or_else(|| RunRequest::words_for_minutes(self.minutes)),
            lookback_days: self.days,
            max_videos: self.videos,
            max_articles: self.articles,
            fetch_transcripts: !self.no_transcripts,
        })
    }
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", style("Error:").red().bold(), message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::from_env();
    if let Some(model) = &cli.model {
        config.gemini_model = model.clone();
    }

    // Validate API key early
    if let Err(e) = config.require_gemini_key() {
        fail(e);
    }

    let request = cli.request().await?;
    if request.title.trim().is_empty() {
        fail(ScriptwrightError::EmptyTitle);
    }

    eprintln!(
        "\n{}  {}\n",
        style("scriptwright").cyan().bold(),
        style("Script Researcher").dim()
    );

    let sources = SourceRegistry::from_config(&config, request.fetch_transcripts).await?;
    for (capability, available) in sources.capabilities() {
        tracing::info!(capability, available, "source capability");
    }
    if request.fetch_transcripts && !sources.transcripts_available() {
        eprintln!(
            "{} yt-dlp not found, transcripts will be skipped",
            style("!").yellow().bold()
        );
    }

    let model = GeminiClient::new(&config)?;
    let progress = Arc::new(SpinnerProgress::new());
    let pipeline = Pipeline::new(sources, Arc::new(model)).with_observer(progress.clone());

    let total_start = Instant::now();
    let result = match pipeline.run(&request).await {
        Ok(result) => {
            progress.finish();
            result
        }
        Err(e) => {
            progress.abandon();
            fail(e);
        }
    };

    if result.analysis_fallback {
        eprintln!(
            "{} Analysis failed, script drafted from raw sources",
            style("!").yellow().bold()
        );
    }

    eprintln!(
        "\n{} {}  {} {}  {} {}\n",
        style("Sources:").dim(),
        style(format_source_breakdown(&result)).cyan(),
        style("Words:").dim(),
        style(result.word_count).cyan().bold(),
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );

    if let Some(path) = &cli.output {
        fs::write(path, format!("{}\n", result.script)).await?;
        eprintln!("{} {}\n", style("Saved:").dim(), style(path.display()).cyan());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        eprintln!("{}", style("─".repeat(60)).dim());
        println!("{}", format_result_readable(&result));
    }

    Ok(())
}
