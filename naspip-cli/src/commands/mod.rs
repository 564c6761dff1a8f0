//! CLI command implementations

pub mod create;
pub mod decode;
pub mod inspect;
pub mod keygen;
pub mod read;

use std::io::Read;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Read JSON from `path`, or from stdin when `path` is `-`.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let text = if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        text
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?
    };
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {path}"))
}

/// Overwrite `target` with `value` when the flag was given.
pub fn override_with(target: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *target = value;
    }
}
