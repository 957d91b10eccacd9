//! # image-checker
//!
//! Cross-checks a set of article images against the article text using an
//! LLM provider (Claude, OpenAI or Gemini) and normalizes whatever the model
//! answers into one common result shape.
//!
//! The interesting part is the provider layer: three adapters that build a
//! vendor-specific multimodal request from the same `(text, images, api key)`
//! input, and one shared routine that digs a JSON array of issues out of
//! free-form (and occasionally truncated) model output.
//!
//! ```no_run
//! use image_checker::{run_check, AppConfig, CheckRequest, ImageInput, Provider};
//!
//! # async fn example() -> Result<(), image_checker::CheckError> {
//! let config = AppConfig::default();
//! let request = CheckRequest {
//!     text: "Title: Summer Sale".to_string(),
//!     images: vec![ImageInput::from_path("banner.png".as_ref()).unwrap()],
//!     api_key: std::env::var("ANTHROPIC_API_KEY").unwrap(),
//!     provider: Provider::Claude,
//! };
//!
//! let outcome = run_check(&config, &request).await?;
//! for issue in &outcome.results {
//!     println!("[{}] {}: {}", issue.severity, issue.kind, issue.description);
//! }
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod check;
pub mod config;
pub mod error;

pub use capture::{CaptureError, PageCapture};
pub use check::{run_check, CheckOutcome, CheckRequest, CheckResult, ImageInput, Provider};
pub use config::AppConfig;
pub use error::CheckError;
