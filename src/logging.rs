use crate::utils::truncate_str;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt as subscriber_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

const CARD_WIDTH: usize = 76;

/// Where and how verbosely the summarizer logs.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_dir: PathBuf,
    pub file_name: String,
    /// Used when `RUST_LOG` is not set.
    pub log_level: String,
    pub console_output: bool,
    pub file_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".into(),
            file_name: "url-summarizer.log".into(),
            log_level: "info".into(),
            console_output: true,
            file_output: false,
        }
    }
}

/// Greedy word wrap; continuation lines are indented by two spaces.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > width {
            lines.push(std::mem::replace(&mut current, "  ".to_string()));
        } else if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.trim().is_empty() {
        lines.push(current);
    }
    lines
}

fn render_card(heading: &str, rows: &[(&str, String)]) -> String {
    let inner = CARD_WIDTH - 4;
    let border = "═".repeat(CARD_WIDTH - 2);
    let mut card = format!("\n╔{border}╗\n║ {:<inner$} ║\n", truncate_str(heading, inner));

    for (label, value) in rows {
        let label_width = label.chars().count() + 2;
        let lines = wrap_text(value, inner - label_width);
        for (i, line) in lines.iter().enumerate() {
            let prefix = if i == 0 {
                format!("{label}: ")
            } else {
                " ".repeat(label_width)
            };
            card.push_str(&format!("║ {:<inner$} ║\n", format!("{prefix}{line}")));
        }
    }

    card.push_str(&format!("╚{border}╝"));
    card
}

pub fn log_summary_card(url: &str, summary: &str) {
    let words = summary.split_whitespace().count();
    info!(
        "{}",
        render_card(
            "Summary",
            &[
                ("URL", truncate_str(url, CARD_WIDTH - 10)),
                ("Words", words.to_string()),
                ("Text", summary.to_string()),
            ],
        )
    );
}

/// Installs the global subscriber: a pretty console layer and, when enabled,
/// a daily rolling file in `log_dir`.
pub fn setup_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let mut layers = Vec::new();

    if config.console_output {
        layers.push(
            subscriber_fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .pretty()
                .boxed(),
        );
    }

    if config.file_output {
        std::fs::create_dir_all(&config.log_dir)?;
        let appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, &config.file_name);
        layers.push(
            subscriber_fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(appender)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    debug!(?config, "Logging initialized");
    Ok(())
}

/// Scoped subscriber for tests and one-off tools; restored on drop.
pub struct LogLevelGuard {
    _guard: tracing::dispatcher::DefaultGuard,
}

impl LogLevelGuard {
    pub fn set_level(level: &str) -> Self {
        let subscriber = tracing_subscriber::registry()
            .with(subscriber_fmt::layer().with_test_writer())
            .with(EnvFilter::new(level));

        LogLevelGuard {
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }
}
