//! Session configuration, loaded from an optional JSON file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};

use crate::domain::chess::Orientation;
use crate::models::session::Depths;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Executable of the UCI engine that picks our moves
    pub engine_path: String,
    /// Search depth for replies
    pub search_depth: u32,
    /// Search depth for the first move when we open the game
    pub opening_depth: u32,
    /// Which colour sits nearer the camera
    pub orientation: Orientation,
    /// Delay between two board captures, in milliseconds
    pub poll_interval_ms: u64,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_path: "stockfish".to_string(),
            search_depth: 20,
            opening_depth: 15,
            orientation: Orientation::WhiteNearer,
            poll_interval_ms: 300,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Read `path`, or fall back to the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn schema() -> Schema {
        schema_for!(Config)
    }

    pub fn depths(&self) -> Depths {
        Depths {
            opening: self.opening_depth,
            reply: self.search_depth,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
