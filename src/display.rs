use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::analysis::AnalysisResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn label(self) -> &'static str {
    match self {
      OutputFormat::Text => "text",
      OutputFormat::Json => "json",
    }
  }
}

pub fn render(result: &AnalysisResult, format: OutputFormat) -> Result<String> {
  match format {
    OutputFormat::Text => Ok(render_text(result)),
    OutputFormat::Json => serde_json::to_string_pretty(result).context("Failed to serialize analysis result"),
  }
}

fn row(label: &str, value: impl std::fmt::Display) -> String {
  format!("  {:<18}{}", label, value)
}

/// Human-readable report.
fn render_text(r: &AnalysisResult) -> String {
  let mut lines = vec![r.playlist_title.clone()];
  if !r.channel_name.is_empty() {
    lines.push(format!("by {}", r.channel_name));
  }
  lines.push(String::new());

  lines.push(row("Videos analyzed", format!("{} of {} (#{})", r.video_count, r.total_videos, r.analyzed_range)));
  if r.unavailable_videos > 0 {
    lines.push(row("Unavailable", format!("{} (deleted, private, or no duration)", r.unavailable_videos)));
  }
  lines.push(row("Original length", &r.original_duration));
  lines.push(row(&format!("At {}", r.speed), &r.adjusted_duration));
  if r.adjusted_seconds < r.original_seconds {
    lines.push(row("Time saved", &r.time_saved));
  }

  if !r.speed_comparison.is_empty() {
    lines.push(String::new());
    lines.push("Speed comparison".to_string());
    for estimate in &r.speed_comparison {
      lines.push(row(&estimate.speed.to_string(), &estimate.duration));
    }
  }

  lines.join("\n")
}
