//! CLI tool for translating PowerPoint decks while preserving layout.

mod http;

use anyhow::{Context, Result};
use clap::Parser;
use http::HttpTranslator;
use slideglot_engine::{translate_document, EngineOptions, SchedulerConfig};
use slideglot_pptx::{save_document, PptxParser};
use std::path::{Path, PathBuf};

/// Translate a PowerPoint deck into another language, keeping the
/// original layout intact.
#[derive(Parser, Debug)]
#[command(name = "slideglot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input presentation (.pptx)
    input: PathBuf,

    /// Target language, e.g. "French" or "Simplified Chinese"
    #[arg(short, long)]
    lang: String,

    /// Output file (default: {stem}_{lang}.pptx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Translation endpoint (OpenAI-compatible chat completions)
    #[arg(long, default_value = "https://api.openai.com/v1/chat/completions")]
    endpoint: String,

    /// API key (default: the SLIDEGLOT_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Model name sent to the endpoint
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// Maximum number of in-flight translation requests
    #[arg(long, default_value = "10")]
    concurrency: usize,

    /// Number of texts scheduled per batch
    #[arg(long, default_value = "10")]
    batch_size: usize,

    /// Retries per text after the first attempt
    #[arg(long, default_value = "2")]
    retries: u32,

    /// Smallest font size in points the reducer may produce
    #[arg(long, default_value = "12")]
    min_font_size: f32,

    /// Print the run summary as JSON instead of plain text
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("SLIDEGLOT_API_KEY").ok())
        .context("No API key: pass --api-key or set SLIDEGLOT_API_KEY")?;

    let parser = PptxParser::new();
    let mut document = parser
        .open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    if args.verbose {
        eprintln!(
            "Loaded {}: {} slides",
            args.input.display(),
            document.slides.len()
        );
    }

    let translator = HttpTranslator::new(args.endpoint.clone(), api_key, args.model.clone())?;

    let config = SchedulerConfig {
        max_concurrent: args.concurrency,
        batch_size: args.batch_size,
        max_retries: args.retries,
        ..Default::default()
    };
    let options = EngineOptions {
        min_font_size_pt: args.min_font_size,
        ..Default::default()
    };

    let summary = translate_document(&mut document, &translator, &args.lang, &config, &options)
        .await
        .context("Translation failed")?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, &args.lang));
    save_document(&document, &output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Saved translated deck to {}", output_path.display());
        println!("  text units replaced: {}", summary.text_units_replaced);
        println!("  font reductions:     {}", summary.font_reductions);
        println!("  width expansions:    {}", summary.width_expansions);
        println!("  word wrap enabled:   {}", summary.word_wrap_enabled);
        println!("  untouched shapes:    {}", summary.untouched);
    }

    Ok(())
}

/// `{stem}_{lang}.pptx` next to the input file.
fn default_output_path(input: &Path, lang: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let safe_lang: String = lang
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let filename = format!("{}_{}.pptx", stem, safe_lang);

    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(filename),
        _ => PathBuf::from(filename),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_next_to_input() {
        let path = default_output_path(Path::new("decks/q3_review.pptx"), "French");
        assert_eq!(path, PathBuf::from("decks/q3_review_French.pptx"));
    }

    #[test]
    fn test_default_output_path_sanitizes_language() {
        let path = default_output_path(Path::new("deck.pptx"), "Simplified Chinese");
        assert_eq!(path, PathBuf::from("deck_Simplified_Chinese.pptx"));
    }
}
