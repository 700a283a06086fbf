use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::time::Duration;
use url_summarizer::{
    log_summary_card, setup_logging, LogConfig, Orchestrator, Outcome, SummarizerConfig,
    SummaryRequest,
};

/// Summarize a YouTube video or a web page with Groq.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// URL of a YouTube video or any website
    url: String,

    /// Groq API key; falls back to GROQ_API_KEY
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Log level passed to the tracing subscriber
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Also write logs to ./logs
    #[arg(long)]
    log_file: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Err(e) = setup_logging(LogConfig {
        log_level: args.log_level.clone(),
        file_output: args.log_file,
        ..LogConfig::default()
    }) {
        eprintln!("{}: could not initialize logging: {e}", "Warning".yellow());
    }

    let api_key = args
        .api_key
        .or_else(|| std::env::var("GROQ_API_KEY").ok())
        .unwrap_or_default();
    let request = SummaryRequest::new(api_key, args.url.clone());

    let orchestrator = Orchestrator::new(SummarizerConfig::from_env())?;

    println!("{}", "URL Summarizer".bold().green());
    println!("{}", "==============".green());
    println!("{}: {}", "Model".bold(), orchestrator.config().model());
    println!("{}: {}\n", "URL".bold(), args.url);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Summarizing...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let cancel = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let outcome = orchestrator.run_until_cancelled(&request, cancel).await;
    spinner.finish_and_clear();

    // failures are already logged by the orchestrator
    match outcome {
        Some(Outcome::Success { summary }) => {
            log_summary_card(&args.url, &summary);
            println!("{}", "Summary".bold().blue());
            println!("{}", "-------".blue());
            println!("{summary}");
        }
        Some(Outcome::Error { message }) => {
            eprintln!("{}: {}", "Error".bold().red(), message);
            std::process::exit(1);
        }
        None => {
            eprintln!("{}", "Cancelled".yellow());
            std::process::exit(130);
        }
    }

    Ok(())
}
