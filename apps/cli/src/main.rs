use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use lecturegen_core::{
    HttpTextGenerator, LectureRequest, LectureResponse, LectureService, OutputMode, Provider,
    format_response_readable,
};

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let total = secs.round() as u64;
        format!("{}m {}s", total / 60, total % 60)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Gemini,
    Openai,
    Grok,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Gemini => Provider::Gemini,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Grok => Provider::Grok,
        }
    }
}

#[derive(Clone, Default, ValueEnum)]
enum CliMode {
    Concise,
    #[default]
    Standard,
    Expanded,
}

impl From<CliMode> for OutputMode {
    fn from(cli: CliMode) -> Self {
        match cli {
            CliMode::Concise => OutputMode::Concise,
            CliMode::Standard => OutputMode::Standard,
            CliMode::Expanded => OutputMode::Expanded,
        }
    }
}

#[derive(Parser)]
#[command(name = "lecturegen")]
#[command(about = "Generate a beginner-friendly biology lecture and study guide with AI")]
struct Cli {
    /// Lecture topic (e.g., "Mitosis"), at most 200 characters
    topic: String,

    /// Comma-separated subtopics to cover, one lecture each
    #[arg(short, long)]
    subtopics: Option<String>,

    /// Level of detail
    #[arg(short, long, default_value = "standard")]
    mode: CliMode,

    /// AI provider for lecture generation
    #[arg(short, long, default_value = "gemini")]
    provider: CliProvider,

    /// Print the normalized JSON instead of the formatted lecture
    #[arg(long)]
    json: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", style("Error:").red().bold(), message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let provider: Provider = cli.provider.into();
    let mode: OutputMode = cli.mode.into();

    // Reject bad input before touching the network
    let request = LectureRequest::new(Some(&cli.topic), cli.subtopics.as_deref(), Some(mode.as_str()))
        .unwrap_or_else(|e| fail(e));

    // Validate API key early
    let generator = HttpTextGenerator::from_env(provider).unwrap_or_else(|e| fail(e));
    let service = LectureService::new(Arc::new(generator));

    println!(
        "\n{}  {}\n",
        style("lecturegen").cyan().bold(),
        style("Biology Lecture Generator").dim()
    );
    println!("{}", style("─".repeat(60)).dim());

    let start = Instant::now();
    let spinner = create_spinner(&format!(
        "Generating {} lecture on {} with {}...",
        mode,
        style(request.topic()).yellow(),
        provider.name()
    ));

    let response = match service.generate_lecture(&request).await {
        Ok(response) => response,
        Err(e) => {
            spinner.finish_and_clear();
            fail(e);
        }
    };

    let status = match &response {
        LectureResponse::Document(_) => format!("{} Lecture generated", style("✓").green().bold()),
        LectureResponse::Fallback { .. } => format!(
            "{} Lecture generated {}",
            style("!").yellow().bold(),
            style("(format issue, showing raw output)").yellow()
        ),
    };
    spinner.finish_with_message(format!(
        "{} {}",
        status,
        style(format!("[{}]", format_duration(start.elapsed()))).dim()
    ));
    println!("{}", style("─".repeat(60)).dim());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", format_response_readable(&response));
    }

    Ok(())
}
