use anyhow::{Context, Result};

use crate::layout::{FontFamily, TailEstimate};

/// Application configuration loaded from environment variables.
/// Every variable is optional; defaults target the A4 print edition.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Font family of the built-in metric measurer.
    pub font: FontFamily,
    pub font_size_px: f32,
    pub tail_estimate: TailEstimate,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let font_size_px = env_or("LAYOUT_FONT_SIZE_PX", "14")
            .parse::<f32>()
            .context("LAYOUT_FONT_SIZE_PX must be a number")?;
        if !(font_size_px > 0.0) {
            anyhow::bail!("LAYOUT_FONT_SIZE_PX must be positive, got {font_size_px}");
        }

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            font: env_or("LAYOUT_FONT", "serif")
                .parse::<FontFamily>()
                .map_err(anyhow::Error::msg)
                .context("LAYOUT_FONT must be 'serif' or 'sans'")?,
            font_size_px,
            tail_estimate: env_or("LAYOUT_TAIL_ESTIMATE", "width-ratio")
                .parse::<TailEstimate>()
                .map_err(anyhow::Error::msg)
                .context("LAYOUT_TAIL_ESTIMATE must be 'width-ratio' or 'remeasure'")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
