//! Display configuration.
//!
//! Read-only formatting options consumed by the execution dispatcher's rich
//! display decoration. Loaded from a JSON file; a missing file means
//! defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// How a rich state dump renders each basis state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpStyle {
    /// Show real amplitudes.
    #[default]
    Amplitudes,
    /// Show measurement probabilities.
    Probabilities,
}

/// Formatting options for rich state dumps.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Value rendered per basis state.
    pub dump_style: DumpStyle,
    /// Decimal places per rendered value.
    pub precision: usize,
    /// Basis states rendered before the dump is truncated.
    pub truncate_after: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            dump_style: DumpStyle::default(),
            precision: 4,
            truncate_after: 16,
        }
    }
}

impl DisplayConfig {
    /// Load configuration from an explicit path, or from the per-user default
    /// location when no path is given. A missing file yields defaults; an
    /// unreadable or unparsable file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };
        Self::from_file(&path)
    }

    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading display config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing display config {}", path.display()))
    }

    /// Per-user default config location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kata-grader").join("display.json"))
    }
}
