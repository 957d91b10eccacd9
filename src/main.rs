use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use image_checker::{run_check, AppConfig, CheckRequest, ImageInput, PageCapture, Provider};

/// Check article images against the article text with an LLM provider.
#[derive(Debug, Parser)]
#[command(name = "image-checker", version, about)]
struct Args {
    /// AI provider: claude, openai or gemini
    #[arg(short, long, default_value = "claude")]
    provider: String,

    /// Article text given inline
    #[arg(short, long, conflicts_with_all = ["text_file", "capture"])]
    text: Option<String>,

    /// File containing the article text
    #[arg(long, conflicts_with = "capture")]
    text_file: Option<PathBuf>,

    /// Capture JSON produced by the page-capture extension
    /// (the `{html, css, url, title}` clipboard blob saved to a file)
    #[arg(long)]
    capture: Option<PathBuf>,

    /// Image files to check (repeatable)
    #[arg(short, long = "image", required = true)]
    images: Vec<PathBuf>,

    /// API key for the chosen provider; falls back to the provider's
    /// environment variable, then to the config file
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Config file (default: <user config dir>/image-checker/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the raw outcome as JSON instead of the grouped report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match args.config.clone().or_else(AppConfig::default_path) {
        Some(path) => AppConfig::load(&path),
        None => AppConfig::default(),
    };

    let provider: Provider = args.provider.parse()?;

    let text = load_text(&args)?;

    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let image = ImageInput::from_path(path)
            .with_context(|| format!("failed to read image {}", path.display()))?;
        log::debug!("loaded {} as {}", path.display(), image.mime_type);
        images.push(image);
    }

    let api_key = args
        .api_key
        .clone()
        .unwrap_or_else(|| config.api_key_for(provider).to_string());

    let request = CheckRequest {
        text,
        images,
        api_key,
        provider,
    };

    let outcome = run_check(&config, &request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        render(&outcome.results);
    }

    Ok(())
}

fn load_text(args: &Args) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.text_file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read text file {}", path.display()));
    }
    if let Some(path) = &args.capture {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read capture file {}", path.display()))?;
        let capture = PageCapture::from_json(&raw)?;
        return Ok(capture.formatted_text());
    }
    bail!("article text is required: pass --text, --text-file or --capture");
}

/// Grouped report in the style of the original web UI: a severity summary,
/// then every issue with its type, location and image reference.
fn render(results: &[image_checker::CheckResult]) {
    if results.is_empty() {
        println!("チェック結果: 問題は見つかりませんでした");
        return;
    }

    let count = |severity: &str| results.iter().filter(|r| r.severity == severity).count();
    println!("チェック結果: {} 件", results.len());
    println!(
        "  重大: {}  中程度: {}  軽微: {}",
        count("high"),
        count("medium"),
        count("low")
    );
    println!();

    for result in results {
        let mut line = format!("[{}] {}: {}", result.severity, result.kind, result.description);
        if let Some(location) = &result.location {
            line.push_str(&format!(" ({location})"));
        }
        if let Some(index) = result.image_index {
            line.push_str(&format!(" [画像{}]", index + 1));
        }
        println!("{line}");
    }
}
