//! Quotes file: the price table simulated runs read their prices from.
//!
//! TOML (`.toml`) or JSON (anything else):
//!
//! ```toml
//! usd_rate = 20000.0
//!
//! [prices]
//! "BTC-ETH" = 0.05
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use signalbot_core::venue::QuoteBoard;

#[derive(Debug, Error)]
pub enum QuotesError {
    #[error("failed to access quotes file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML quotes: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to encode TOML quotes: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("invalid JSON quotes: {0}")]
    Json(#[from] serde_json::Error),
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

/// Load a quote board; a missing file yields an empty board.
pub fn load_quotes(path: &Path) -> Result<QuoteBoard, QuotesError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(QuoteBoard::new()),
        Err(source) => {
            return Err(QuotesError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if is_toml(path) {
        Ok(toml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

pub fn save_quotes(path: &Path, board: &QuoteBoard) -> Result<(), QuotesError> {
    let content = if is_toml(path) {
        toml::to_string_pretty(board)?
    } else {
        serde_json::to_string_pretty(board)?
    };
    fs::write(path, content).map_err(|source| QuotesError::Io {
        path: path.to_path_buf(),
        source,
    })
}
