mod analysis;
mod config;
mod constants;
mod display;
mod duration;
mod error;
#[cfg(test)]
mod fake;
mod logging;
mod playlist;
mod range;
mod youtube;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use tracing::{error, info};

use analysis::{AnalysisRequest, analyze_playlist};
use config::{API_KEY_ENV, Config};
use constants::constants;
use display::OutputFormat;
use logging::LogTarget;
use youtube::{ApiKey, YouTubeClient};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Write logs to stderr instead of the log file
  #[arg(long, global = true)]
  log_stderr: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Estimate how long a YouTube playlist (or part of it) takes to watch
  Analyze(AnalyzeArgs),
  /// Store a YouTube Data API key in the config file
  SetKey {
    key: String,
  },
  /// Print a shell completion script
  Completions {
    shell: clap_complete::Shell,
  },
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
  /// Playlist URL, e.g. https://www.youtube.com/playlist?list=...
  url: String,

  /// First video to include (1-based)
  #[arg(short, long, default_value_t = 1)]
  start: usize,

  /// Last video to include (default: the end of the playlist)
  #[arg(short, long)]
  end: Option<usize>,

  /// Playback speed, e.g. 1.25 or 2 (default: from config, else 1)
  #[arg(short = 'x', long, value_parser = parse_speed)]
  speed: Option<f64>,

  /// Output format
  #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
  format: OutputFormat,

  /// YouTube Data API key (overrides $YOUTUBE_API_KEY and the config file)
  #[arg(long)]
  api_key: Option<String>,

  /// How many video-detail batches to request at once
  #[arg(long)]
  concurrency: Option<usize>,
}

fn parse_speed(s: &str) -> Result<f64, String> {
  let value: f64 = s.trim().trim_end_matches('x').parse().map_err(|_| format!("'{}' is not a number", s))?;
  let c = constants();
  if !(c.min_speed..=c.max_speed).contains(&value) {
    return Err(format!("speed must be between {} and {}", c.min_speed, c.max_speed));
  }
  Ok(value)
}

// --- Commands ---

async fn run_analyze(args: AnalyzeArgs) -> Result<()> {
  let config = Config::load();

  let key = config.resolve_api_key(args.api_key, std::env::var(API_KEY_ENV).ok());
  let api_key = ApiKey::new(key)?;

  let speed = args.speed.unwrap_or_else(|| config.default_speed());
  let concurrency = args.concurrency.unwrap_or_else(|| config.batch_concurrency());
  let request = AnalysisRequest::new(args.url, args.start, args.end, speed)?.with_batch_concurrency(concurrency);

  let client = YouTubeClient::new(api_key, config.request_timeout()).context("Failed to build HTTP client")?;
  info!(url = %request.url, speed, concurrency, format = args.format.label(), "analyze: starting");

  let result = analyze_playlist(&client, &request).await.context("Playlist analysis failed")?;
  println!("{}", display::render(&result, args.format)?);
  Ok(())
}

fn run_set_key(key: String) -> Result<()> {
  let key = key.trim().to_string();
  if key.is_empty() {
    bail!("API key must not be empty");
  }
  let mut config = Config::load();
  config.api_key = Some(key);
  let path = config.save()?;
  info!(path = %path.display(), "set-key: stored API key");
  println!("Saved API key to {}", path.display());
  Ok(())
}

// --- Main ---

#[tokio::main]
async fn main() {
  let args = Args::parse();

  if let Command::Completions { shell } = args.command {
    clap_complete::generate(shell, &mut Args::command(), "playtime", &mut std::io::stdout());
    return;
  }

  let target = if args.log_stderr { LogTarget::Stderr } else { LogTarget::default_for_platform() };
  let guard = match logging::init(target) {
    Ok(guard) => Some(guard),
    Err(e) => {
      eprintln!("warning: logging disabled: {:#}", e);
      None
    }
  };

  let outcome = match args.command {
    Command::Analyze(analyze) => run_analyze(analyze).await,
    Command::SetKey { key } => run_set_key(key),
    Command::Completions { .. } => Ok(()),
  };

  if let Err(e) = outcome {
    error!(err = %format!("{:#}", e), "command failed");
    eprintln!("error: {:#}", e);
    drop(guard);
    std::process::exit(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- parse_speed ---

  #[test]
  fn parse_speed_accepts_presets_and_custom() {
    assert_eq!(parse_speed("1"), Ok(1.0));
    assert_eq!(parse_speed("1.75"), Ok(1.75));
    assert_eq!(parse_speed("2x"), Ok(2.0));
  }

  #[test]
  fn parse_speed_rejects_out_of_range() {
    assert!(parse_speed("0").is_err());
    assert!(parse_speed("-1").is_err());
    assert!(parse_speed("10.5").is_err());
    assert!(parse_speed("fast").is_err());
  }

  // --- CLI shape ---

  #[test]
  fn cli_definition_is_consistent() {
    Args::command().debug_assert();
  }

  #[test]
  fn analyze_defaults() {
    let args = Args::try_parse_from(["playtime", "analyze", "https://youtube.com/playlist?list=PL1"]).unwrap();
    let Command::Analyze(a) = args.command else { panic!("expected analyze") };
    assert_eq!(a.start, 1);
    assert_eq!(a.end, None);
    assert_eq!(a.speed, None);
    assert_eq!(a.format, OutputFormat::Text);
  }

  #[test]
  fn analyze_with_range_and_speed() {
    let args = Args::try_parse_from([
      "playtime",
      "analyze",
      "https://youtube.com/playlist?list=PL1",
      "--start",
      "3",
      "--end",
      "10",
      "-x",
      "1.5",
      "--format",
      "json",
    ])
    .unwrap();
    let Command::Analyze(a) = args.command else { panic!("expected analyze") };
    assert_eq!((a.start, a.end, a.speed), (3, Some(10), Some(1.5)));
    assert_eq!(a.format, OutputFormat::Json);
  }
}
